//! Function-calling agent loop
//!
//! Offers every tool to the model as a function declaration, runs the calls
//! it returns, and feeds the results back until the model answers in text.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::Result;
use crate::genai::{Content, GenerateRequest, GenerativeClient, Part, Usage};
use crate::tools::{ToolContext, ToolExecutor, ToolInvocation};

/// Turn limit used when none is configured
pub const DEFAULT_MAX_TURNS: usize = 16;

/// One tool call the model made, with what it got back
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub name: String,
    pub args: Value,
    pub response: Value,
    pub is_error: bool,
}

/// Final result of an agent run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReply {
    /// Text of the last model turn
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub turns: usize,
    /// True when the turn limit stopped the loop before a text-only answer
    pub exhausted: bool,
    pub usage: Usage,
}

pub struct Agent {
    client: Arc<dyn GenerativeClient>,
    executor: ToolExecutor,
    ctx: ToolContext,
    model: String,
    max_turns: usize,
    system_instruction: Option<String>,
}

impl Agent {
    /// Agent with the standard tool set and the client's default model
    pub fn new(client: Arc<dyn GenerativeClient>, ctx: ToolContext) -> Self {
        let model = client.model().to_string();
        Self {
            client,
            executor: ToolExecutor::standard(),
            ctx,
            model,
            max_turns: DEFAULT_MAX_TURNS,
            system_instruction: None,
        }
    }

    pub fn with_executor(mut self, executor: ToolExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the loop for one user prompt
    ///
    /// Only collaborator failures end the run with an error. A failing tool is
    /// reported back to the model as `{"error": ...}`.
    pub async fn run(&self, prompt: &str) -> Result<AgentReply> {
        let declarations = self.executor.function_declarations();
        let mut history = vec![Content::user_text(prompt)];
        let mut reply = AgentReply::default();

        while reply.turns < self.max_turns {
            reply.turns += 1;

            let mut request = GenerateRequest::new()
                .with_model(&self.model)
                .with_contents(history.clone())
                .with_functions(declarations.clone());
            if let Some(instruction) = &self.system_instruction {
                request = request.with_system_instruction(instruction);
            }

            let response = self.client.generate_content(request).await?;
            reply.usage.add(&response.usage);
            reply.text = response.text();
            history.push(response.to_content());

            let calls: Vec<(String, Value)> = response
                .function_calls()
                .map(|(name, args)| (name.to_string(), args.clone()))
                .collect();

            if calls.is_empty() {
                log::info!("Agent finished after {} turn(s)", reply.turns);
                return Ok(reply);
            }

            log::debug!("Turn {}: {} tool call(s)", reply.turns, calls.len());

            let mut responses = Vec::with_capacity(calls.len());
            for (name, args) in calls {
                let record = self.call_tool(name, args).await;
                responses.push(Part::FunctionResponse {
                    name: record.name.clone(),
                    response: record.response.clone(),
                });
                reply.tool_calls.push(record);
            }
            history.push(Content::user(responses));
        }

        log::warn!("Agent stopped after reaching the {} turn limit", self.max_turns);
        reply.exhausted = true;
        Ok(reply)
    }

    async fn call_tool(&self, name: String, args: Value) -> ToolCallRecord {
        let outcome = match ToolInvocation::from_json(name.clone(), args.clone()) {
            Ok(invocation) => self.executor.execute(&invocation, &self.ctx).await,
            Err(e) => Err(e),
        };

        let (response, is_error) = match outcome {
            Ok(output) => (output.to_json(), false),
            Err(e) => {
                log::info!("Tool {} returned error to model: {}", name, e);
                (json!({ "error": e.to_string() }), true)
            }
        };

        ToolCallRecord {
            name,
            args,
            response,
            is_error,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.model)
            .field("max_turns", &self.max_turns)
            .field("tools", &self.executor.tool_names())
            .field("ctx", &self.ctx)
            .finish()
    }
}
