//! Structured JSON generation against a response schema

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::GenerativeClient;
use super::types::{GenerateRequest, GenerationConfig};
use crate::error::Result;

/// Ask the model for JSON matching `schema` and deserialize it into `T`
pub async fn generate_json<T: DeserializeOwned>(
    client: &dyn GenerativeClient,
    model: &str,
    prompt: &str,
    schema: Value,
) -> Result<T> {
    let request = GenerateRequest::new()
        .with_model(model)
        .with_user_text(prompt)
        .with_config(GenerationConfig::json(schema));

    let response = client.generate_content(request).await?;
    let text = response.text();
    log::debug!("Structured response: {} bytes", text.len());

    Ok(serde_json::from_str(&text)?)
}
