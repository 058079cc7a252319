//! Tool system - schemas, catalog and executors
//!
//! Every tool is a named operation with a ToolSpec an agent can read and an
//! async executor that runs against a ToolContext.

mod args;
mod catalog;
mod command;
mod context;
mod executor;
pub mod filesystem;
pub mod image;
mod spec;
pub mod tree;

pub use args::{ToolArgs, ToolInvocation};
pub use catalog::ToolCatalog;
pub use command::{CommandOutput, RunCommandTool, run_command};
pub use context::ToolContext;
pub use executor::ToolExecutor;
pub use filesystem::{
    AppendToFileTool, CopyFileTool, CreateDirectoryTool, CreateFileTool, DeleteFileTool, DoesFileExistTool,
    MoveFileTool, ReadFileTool, WriteFileTool,
};
pub use image::{GenerateImageTool, ModifyImageTool, MoveTheImageTool, OpenAnImageTool, SavedImage};
pub use spec::{ParamType, ParameterSpec, ToolSpec};
pub use tree::{DEFAULT_MAX_TREE_DEPTH, GetDirectoryTreeTool};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

use crate::error::Result;

/// A tool that can be invoked by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Catalog name
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Declared parameters, in order
    fn parameters(&self) -> Vec<ParameterSpec>;

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.name(), self.description()).with_params(self.parameters())
    }

    /// Run with arguments already bound against `spec()`
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput>;
}

/// Value returned by a successful tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// Confirmation of a side effect
    Message(String),
    /// File or tree content
    Text(String),
    /// Raw file bytes
    Bytes(Vec<u8>),
    Bool(bool),
    Command(CommandOutput),
}

impl ToolOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Message(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form handed back to a model or printed by the CLI
    ///
    /// Bytes are base64-encoded.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Message(msg) => json!({ "message": msg }),
            Self::Text(text) => json!({ "content": text }),
            Self::Bytes(bytes) => json!({
                "encoding": "base64",
                "size": bytes.len(),
                "data": BASE64.encode(bytes)
            }),
            Self::Bool(value) => json!({ "result": value }),
            Self::Command(output) => json!({
                "stdout": output.stdout,
                "stderr": output.stderr,
                "exit_code": output.exit_code
            }),
        }
    }
}

/// Every built-in tool, in catalog order
pub fn builtin_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CreateFileTool),
        Box::new(CreateDirectoryTool),
        Box::new(DeleteFileTool),
        Box::new(DoesFileExistTool),
        Box::new(GetDirectoryTreeTool),
        Box::new(ReadFileTool),
        Box::new(WriteFileTool),
        Box::new(AppendToFileTool),
        Box::new(CopyFileTool),
        Box::new(MoveFileTool),
        Box::new(OpenAnImageTool),
        Box::new(MoveTheImageTool),
        Box::new(GenerateImageTool),
        Box::new(ModifyImageTool),
        Box::new(RunCommandTool),
    ]
}
