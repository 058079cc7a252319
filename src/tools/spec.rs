//! Tool and parameter schemas
//!
//! A ToolSpec is the machine-readable description an agent sees for each tool.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
        }
    }

    /// Whether a JSON value has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
        }
    }
}

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    /// A required string parameter
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::String,
            description: description.into(),
            default: None,
            required: true,
        }
    }

    /// An optional string parameter
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    /// Set the default used when the argument is absent
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn property(&self, include_default: bool) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(self.param_type.as_str()));
        prop.insert("description".to_string(), json!(self.description));
        if include_default {
            if let Some(default) = &self.default {
                prop.insert("default".to_string(), json!(default));
            }
        }
        Value::Object(prop)
    }
}

/// Name, description and ordered parameters of one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(params);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Required parameter names in declaration order
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    fn parameters_schema(&self, include_defaults: bool) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(param.name.clone(), param.property(include_defaults));
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required()
        })
    }

    /// Export as `{name, description, parameters: {type, properties, required}}`
    pub fn to_schema(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters_schema(true)
        })
    }

    /// Export as a Gemini function declaration (no `default` keys)
    pub fn to_function_declaration(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters_schema(false)
        })
    }
}
