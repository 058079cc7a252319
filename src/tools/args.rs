//! Tool invocations and their bound arguments

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::spec::ToolSpec;
use crate::error::{Result, ToolbeltError};

/// A request to run one tool with named arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    #[serde(rename = "name", alias = "tool_name")]
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// An invocation with no arguments yet
    pub fn named(tool_name: impl Into<String>) -> Self {
        Self::new(tool_name, Map::new())
    }

    /// Build from a JSON arguments value; `null` means no arguments
    pub fn from_json(tool_name: impl Into<String>, arguments: Value) -> Result<Self> {
        let tool_name = tool_name.into();
        match arguments {
            Value::Object(map) => Ok(Self::new(tool_name, map)),
            Value::Null => Ok(Self::named(tool_name)),
            other => Err(ToolbeltError::invalid_arguments(
                tool_name,
                format!("arguments must be a JSON object, got {}", json_type_name(&other)),
            )),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Check the arguments against `spec` and resolve defaults
    ///
    /// Argument names the spec does not declare are ignored.
    pub fn bind(&self, spec: &ToolSpec) -> Result<ToolArgs> {
        for name in self.arguments.keys() {
            if spec.parameter(name).is_none() {
                log::warn!("Ignoring unknown argument '{}' for tool {}", name, spec.name);
            }
        }

        let mut values = HashMap::new();
        for param in &spec.parameters {
            match self.arguments.get(&param.name) {
                Some(value) if param.param_type.accepts(value) => {
                    if let Some(s) = value.as_str() {
                        values.insert(param.name.clone(), s.to_string());
                    }
                }
                Some(value) => {
                    return Err(ToolbeltError::invalid_arguments(
                        &spec.name,
                        format!(
                            "parameter '{}' must be a {}, got {}",
                            param.name,
                            param.param_type.as_str(),
                            json_type_name(value)
                        ),
                    ));
                }
                None if param.required => {
                    return Err(ToolbeltError::invalid_arguments(
                        &spec.name,
                        format!("missing required parameter '{}'", param.name),
                    ));
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(ToolArgs {
            tool: spec.name.clone(),
            values,
        })
    }
}

/// Arguments validated against a ToolSpec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    tool: String,
    values: HashMap<String, String>,
}

impl ToolArgs {
    /// A present (or defaulted) string argument
    pub fn str(&self, name: &str) -> Result<&str> {
        self.opt_str(name).ok_or_else(|| {
            ToolbeltError::invalid_arguments(&self.tool, format!("missing required parameter '{}'", name))
        })
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
