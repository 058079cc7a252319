//! Typed request/response model for the generative-AI collaborator
//!
//! Wire JSON is decoded into these types once, at the client boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "model" => Role::Model,
            _ => Role::User,
        }
    }
}

/// Output modality requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

/// One segment of a request or response
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
    FunctionCall { name: String, args: Value },
    FunctionResponse { name: String, response: Value },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Part::InlineData {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Inline binary data of any MIME type
    pub fn as_inline_data(&self) -> Option<(&str, &[u8])> {
        match self {
            Part::InlineData { mime_type, data } => Some((mime_type, data)),
            _ => None,
        }
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self { role: Role::User, parts }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::text(text)])
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// Generation settings sent with a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
}

impl GenerationConfig {
    /// Ask for interleaved text and image parts
    pub fn text_and_image() -> Self {
        Self {
            response_modalities: vec![Modality::Text, Modality::Image],
            ..Default::default()
        }
    }

    /// Ask for a JSON document matching `schema`
    pub fn json(schema: Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.response_modalities.is_empty() && self.response_mime_type.is_none() && self.response_schema.is_none()
    }
}

/// Request for one `generate_content` call
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Overrides the client's default model when set
    pub model: Option<String>,
    pub contents: Vec<Content>,
    pub config: GenerationConfig,
    /// Function declarations offered to the model
    pub functions: Vec<Value>,
    pub system_instruction: Option<String>,
}

impl GenerateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn with_contents(mut self, contents: Vec<Content>) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_user_text(self, text: impl Into<String>) -> Self {
        self.with_content(Content::user_text(text))
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_functions(mut self, functions: Vec<Value>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Token accounting reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub candidate_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.candidate_tokens
    }

    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.candidate_tokens += other.candidate_tokens;
    }
}

/// Parts of the first candidate, already decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub parts: Vec<Part>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl GenerateResponse {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    /// All text parts joined together
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(Part::as_text)
    }

    /// Inline data parts; the MIME label is not trusted, decoding decides
    pub fn images(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts.iter().filter_map(Part::as_inline_data)
    }

    pub fn first_image(&self) -> Option<(&str, &[u8])> {
        self.images().next()
    }

    pub fn function_calls(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parts.iter().filter_map(|p| match p {
            Part::FunctionCall { name, args } => Some((name.as_str(), args)),
            _ => None,
        })
    }

    /// This response as a model turn for conversation history
    pub fn to_content(&self) -> Content {
        Content::model(self.parts.clone())
    }
}
