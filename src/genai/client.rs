//! Collaborator trait, its error type, and a scripted mock

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{GenerateRequest, GenerateResponse};

/// Request/response client for a generative-AI API
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// One `generate_content` round trip
    async fn generate_content(&self, request: GenerateRequest) -> Result<GenerateResponse, GenAiError>;

    /// Model used when the request does not name one
    fn model(&self) -> &str;
}

/// Errors raised at the collaborator boundary
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing API key: {} is absent or empty and GEMINI_API_KEY is not set", path.display())]
    MissingApiKey { path: PathBuf },

    #[error("No generative-AI client configured")]
    NotConfigured,
}

impl GenAiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GenAiError::ApiError { status: 429, .. })
    }

    /// Informational only; nothing in this crate retries
    pub fn is_retryable(&self) -> bool {
        match self {
            GenAiError::ApiError { status, .. } => *status == 429 || *status >= 500,
            GenAiError::Network(_) => true,
            GenAiError::InvalidResponse(_) => false,
            GenAiError::Json(_) => false,
            GenAiError::MissingApiKey { .. } => false,
            GenAiError::NotConfigured => false,
        }
    }
}

/// Mock client that replays scripted responses and records requests
#[derive(Debug, Default)]
pub struct MockClient {
    model: String,
    responses: Mutex<VecDeque<GenerateResponse>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            ..Default::default()
        }
    }

    /// Queue a response; responses are returned in FIFO order
    pub fn with_response(self, response: GenerateResponse) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl GenerativeClient for MockClient {
    async fn generate_content(&self, request: GenerateRequest) -> Result<GenerateResponse, GenAiError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| GenAiError::InvalidResponse("no scripted response left".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::Part;

    #[test]
    fn test_genai_error_is_retryable() {
        assert!(
            GenAiError::ApiError {
                status: 503,
                message: "overloaded".to_string()
            }
            .is_retryable()
        );
        assert!(
            GenAiError::ApiError {
                status: 429,
                message: "quota".to_string()
            }
            .is_rate_limit()
        );
        assert!(
            !GenAiError::ApiError {
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );
        assert!(!GenAiError::NotConfigured.is_retryable());
        assert!(
            !GenAiError::MissingApiKey {
                path: PathBuf::from("api_key.txt")
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_missing_api_key_message() {
        let err = GenAiError::MissingApiKey {
            path: PathBuf::from("api_key.txt"),
        };
        assert!(err.to_string().contains("api_key.txt"));
    }

    #[tokio::test]
    async fn test_mock_client_replays_in_order() {
        let mock = MockClient::new()
            .with_response(GenerateResponse::from_parts(vec![Part::text("first")]))
            .with_response(GenerateResponse::from_parts(vec![Part::text("second")]));

        let first = mock.generate_content(GenerateRequest::new().with_user_text("a")).await.unwrap();
        let second = mock.generate_content(GenerateRequest::new().with_user_text("b")).await.unwrap();

        assert_eq!(first.text(), "first");
        assert_eq!(second.text(), "second");
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.requests()[1].contents[0].text(), "b");
    }

    #[tokio::test]
    async fn test_mock_client_exhausted() {
        let mock = MockClient::new();
        let result = mock.generate_content(GenerateRequest::new()).await;
        assert!(matches!(result, Err(GenAiError::InvalidResponse(_))));
        assert_eq!(mock.model(), "mock-model");
    }
}
