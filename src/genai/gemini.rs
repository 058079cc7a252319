//! Gemini REST client
//!
//! Implements GenerativeClient against the `generateContent` endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::{Value, json};

use super::client::{GenAiError, GenerativeClient};
use super::types::{Content, GenerateRequest, GenerateResponse, Part, Role, Usage};

/// Public Gemini API host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_VERSION: &str = "v1beta";

/// Model for chat and structured output
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Model able to return image parts
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Default location of the plaintext API key
pub const DEFAULT_API_KEY_FILE: &str = "api_key.txt";

const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_file: PathBuf,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
            timeout: Duration::from_secs(300),
        }
    }
}

impl GeminiConfig {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Read the API key from `path` (whitespace trimmed), falling back to GEMINI_API_KEY
pub fn read_api_key(path: &Path) -> Result<String, GenAiError> {
    let from_file = std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if let Some(key) = from_file {
        return Ok(key);
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GenAiError::MissingApiKey {
            path: path.to_path_buf(),
        })
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client, reading the key from `config.api_key_file`
    pub fn new(config: GeminiConfig) -> Result<Self, GenAiError> {
        let api_key = read_api_key(&config.api_key_file)?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, GenAiError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            API_VERSION,
            model
        )
    }

    /// Build the JSON body for `generateContent`
    fn build_request(&self, request: &GenerateRequest) -> Value {
        let contents: Vec<Value> = request.contents.iter().map(encode_content).collect();

        let mut body = json!({ "contents": contents });

        if !request.config.is_empty() {
            let mut generation = serde_json::Map::new();
            if !request.config.response_modalities.is_empty() {
                generation.insert(
                    "responseModalities".to_string(),
                    json!(request.config.response_modalities),
                );
            }
            if let Some(mime) = &request.config.response_mime_type {
                generation.insert("responseMimeType".to_string(), json!(mime));
            }
            if let Some(schema) = &request.config.response_schema {
                generation.insert("responseSchema".to_string(), schema.clone());
            }
            body["generationConfig"] = Value::Object(generation);
        }

        if !request.functions.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": request.functions }]);
        }

        if let Some(instruction) = &request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }

        body
    }

    /// Send a request body and return the parsed JSON reply
    async fn send_request(&self, url: &str, body: &Value) -> Result<Value, GenAiError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenAiError::ApiError {
                status: status.as_u16(),
                message: api_error_message(&error_body),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_content(&self, request: GenerateRequest) -> Result<GenerateResponse, GenAiError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let url = self.endpoint(model);
        let body = self.build_request(&request);

        log::debug!("generateContent model={} contents={}", model, request.contents.len());
        let reply = self.send_request(&url, &body).await?;
        parse_response(&reply)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

fn encode_content(content: &Content) -> Value {
    let parts: Vec<Value> = content.parts.iter().map(encode_part).collect();
    json!({ "role": content.role.as_str(), "parts": parts })
}

fn encode_part(part: &Part) -> Value {
    match part {
        Part::Text(text) => json!({ "text": text }),
        Part::InlineData { mime_type, data } => json!({
            "inline_data": { "mime_type": mime_type, "data": STANDARD.encode(data) }
        }),
        Part::FunctionCall { name, args } => json!({
            "functionCall": { "name": name, "args": args }
        }),
        Part::FunctionResponse { name, response } => json!({
            "functionResponse": { "name": name, "response": response }
        }),
    }
}

/// Decode one wire part; unknown part kinds yield None
fn decode_part(value: &Value) -> Result<Option<Part>, GenAiError> {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Ok(Some(Part::Text(text.to_string())));
    }

    if let Some(inline) = value.get("inlineData").or_else(|| value.get("inline_data")) {
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("application/octet-stream")
            .to_string();
        let encoded = inline
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| GenAiError::InvalidResponse("inline data part without data".to_string()))?;
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| GenAiError::InvalidResponse(format!("inline data is not base64: {}", e)))?;
        return Ok(Some(Part::InlineData { mime_type, data }));
    }

    if let Some(call) = value.get("functionCall") {
        let name = call
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GenAiError::InvalidResponse("function call without name".to_string()))?
            .to_string();
        let args = call.get("args").cloned().unwrap_or_else(|| json!({}));
        return Ok(Some(Part::FunctionCall { name, args }));
    }

    Ok(None)
}

/// Decode `candidates[0].content.parts` into typed parts
fn parse_response(body: &Value) -> Result<GenerateResponse, GenAiError> {
    let usage = body
        .get("usageMetadata")
        .map(|u| Usage {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            candidate_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
        })
        .unwrap_or_default();

    let Some(candidate) = body.get("candidates").and_then(|c| c.get(0)) else {
        if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
            log::warn!("Prompt blocked: {}", reason);
        }
        return Ok(GenerateResponse {
            usage,
            ..Default::default()
        });
    };

    let mut parts = Vec::new();
    if let Some(wire_parts) = candidate["content"]["parts"].as_array() {
        for wire in wire_parts {
            if let Some(part) = decode_part(wire)? {
                parts.push(part);
            }
        }
    }

    if let Some(role) = candidate["content"]["role"].as_str() {
        if Role::from_wire(role) != Role::Model {
            log::debug!("Unexpected candidate role: {}", role);
        }
    }

    Ok(GenerateResponse {
        parts,
        finish_reason: candidate["finishReason"].as_str().map(String::from),
        usage,
    })
}

/// Pull `error.message` out of a Google API error body when present
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::GenerationConfig;
    use tempfile::tempdir;

    fn test_client() -> GeminiClient {
        GeminiClient::with_api_key("test-key", GeminiConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key_file, PathBuf::from("api_key.txt"));
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_config_with_model() {
        let config = GeminiConfig::with_model(DEFAULT_IMAGE_MODEL);
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_read_api_key_trims_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api_key.txt");
        std::fs::write(&path, "  secret-key\n").unwrap();

        assert_eq!(read_api_key(&path).unwrap(), "secret-key");
    }

    #[test]
    fn test_endpoint() {
        let client = test_client();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_text_and_image() {
        let client = test_client();
        let request = GenerateRequest::new()
            .with_content(Content::user(vec![
                Part::text("a cat 512x512"),
                Part::inline_data("image/png", vec![1, 2, 3]),
            ]))
            .with_config(GenerationConfig::text_and_image());

        let body = client.build_request(&request);

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a cat 512x512");
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["TEXT", "IMAGE"]));
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_build_request_json_schema_and_tools() {
        let client = test_client();
        let request = GenerateRequest::new()
            .with_user_text("recipes")
            .with_config(GenerationConfig::json(json!({"type": "array"})))
            .with_functions(vec![json!({"name": "read_file"})])
            .with_system_instruction("be brief");

        let body = client.build_request(&request);

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "array");
        assert!(body["generationConfig"].get("responseModalities").is_none());
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "read_file");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn test_build_request_omits_empty_config() {
        let client = test_client();
        let body = client.build_request(&GenerateRequest::new().with_user_text("hi"));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_parse_response_text_and_image() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3}
        });

        let response = parse_response(&body).unwrap();

        assert_eq!(response.parts.len(), 2);
        assert_eq!(response.text(), "Here is your image");
        assert_eq!(response.first_image(), Some(("image/png", &[1u8, 2, 3][..])));
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.usage.total(), 10);
    }

    #[test]
    fn test_parse_response_snake_case_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"inline_data": {"mime_type": "image/jpeg", "data": "AQID"}}]}
            }]
        });

        let response = parse_response(&body).unwrap();
        assert_eq!(response.first_image().map(|(m, _)| m), Some("image/jpeg"));
    }

    #[test]
    fn test_parse_response_inline_data_without_mime_type() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "AQID"}}]}}]
        });

        let response = parse_response(&body).unwrap();
        assert_eq!(response.parts.len(), 1);
        assert_eq!(response.first_image(), Some(("application/octet-stream", &[1u8, 2, 3][..])));
    }

    #[test]
    fn test_parse_response_function_call() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "read_file", "args": {"path": "a.txt"}}}
                ]}
            }]
        });

        let response = parse_response(&body).unwrap();
        let calls: Vec<_> = response.function_calls().collect();
        assert_eq!(calls, vec![("read_file", &json!({"path": "a.txt"}))]);
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response = parse_response(&body).unwrap();
        assert!(response.parts.is_empty());
        assert!(response.first_image().is_none());
    }

    #[test]
    fn test_parse_response_bad_base64() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "!!!"}}]}}]
        });
        assert!(matches!(parse_response(&body), Err(GenAiError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_response_skips_unknown_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"executableCode": {"code": "x"}}, {"text": "done"}]}}]
        });
        let response = parse_response(&body).unwrap();
        assert_eq!(response.parts, vec![Part::text("done")]);
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }
}
