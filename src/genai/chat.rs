//! Multi-turn chat session that keeps its own history

use std::sync::Arc;

use super::client::{GenAiError, GenerativeClient};
use super::types::{Content, GenerateRequest, Role};

/// A conversation whose history is resent on every turn
pub struct ChatSession {
    client: Arc<dyn GenerativeClient>,
    model: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn GenerativeClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            history: Vec::new(),
        }
    }

    /// Send a user message and return the model's text reply
    ///
    /// On failure the user turn is dropped so history stays alternating.
    pub async fn send_message(&mut self, text: impl Into<String>) -> Result<String, GenAiError> {
        self.history.push(Content::user_text(text));

        let request = GenerateRequest::new()
            .with_model(self.model.clone())
            .with_contents(self.history.clone());

        match self.client.generate_content(request).await {
            Ok(response) => {
                let reply = response.text();
                self.history.push(response.to_content());
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// (role, text) view of every turn so far
    pub fn history(&self) -> Vec<(Role, String)> {
        self.history.iter().map(|c| (c.role, c.text())).collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("model", &self.model)
            .field("turns", &self.history.len())
            .finish()
    }
}
