//! Toolbelt - schema-described tools for generative-AI agents
//!
//! A fixed catalog of filesystem, image and shell tools, each with a JSON
//! schema an agent can read and an async executor, plus a Gemini client,
//! chat and structured-output helpers, and a function-calling agent loop.

pub mod agent;
pub mod config;
pub mod error;
pub mod genai;
pub mod tools;

pub use error::{Result, ToolbeltError};
