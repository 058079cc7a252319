//! Tool executor - manages tool registration and execution

use std::collections::HashMap;

use serde_json::Value;

use super::{Tool, ToolContext, ToolInvocation, ToolOutput, ToolSpec, builtin_tools};
use crate::error::{Result, ToolbeltError};

/// Dispatches invocations to registered tools by name
pub struct ToolExecutor {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolExecutor {
    /// Create executor with every built-in tool
    pub fn standard() -> Self {
        let mut executor = Self::new();
        for tool in builtin_tools() {
            executor.add_tool(tool);
        }
        executor
    }

    /// Create an empty executor (for custom tool sets)
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        match self.index.get(tool.name()) {
            Some(&i) => self.tools[i] = tool,
            None => {
                self.index.insert(tool.name().to_string(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Specs in registration order
    pub fn definitions(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn function_declarations(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.spec().to_function_declaration()).collect()
    }

    /// Bind the invocation's arguments and run the named tool
    pub async fn execute(&self, invocation: &ToolInvocation, ctx: &ToolContext) -> Result<ToolOutput> {
        let tool = self
            .index
            .get(&invocation.tool_name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolbeltError::UnknownTool {
                name: invocation.tool_name.clone(),
            })?;

        let args = invocation.bind(&tool.spec())?;
        log::debug!("Executing tool {} with {} argument(s)", tool.name(), args.len());

        let result = tool.execute(&args, ctx).await;
        if let Err(e) = &result {
            log::warn!("Tool {} failed: {}", tool.name(), e);
        }
        result
    }

    /// Run invocations one after another, in order
    pub async fn execute_all(&self, invocations: &[ToolInvocation], ctx: &ToolContext) -> Vec<Result<ToolOutput>> {
        let mut results = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            results.push(self.execute(invocation, ctx).await);
        }
        results
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::standard()
    }
}
