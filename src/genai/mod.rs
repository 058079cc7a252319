//! Generative-AI collaborator boundary
//!
//! This module provides:
//! - Typed parts/contents for requests and responses
//! - GenerativeClient trait for API abstraction
//! - GeminiClient implementation over the REST API
//! - ChatSession and structured JSON helpers

pub mod chat;
pub mod client;
pub mod gemini;
pub mod structured;
pub mod types;

pub use chat::ChatSession;
pub use client::{GenAiError, GenerativeClient, MockClient};
pub use gemini::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, GeminiClient, GeminiConfig, read_api_key};
pub use structured::generate_json;
pub use types::{Content, GenerateRequest, GenerateResponse, GenerationConfig, Modality, Part, Role, Usage};
