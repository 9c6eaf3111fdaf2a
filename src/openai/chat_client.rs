use crate::{
    error::{ComicError, Result},
    models::{ApiErrorEnvelope, ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};

/// Client for POST {base_url}/chat/completions, used only for the
/// optional custom HTML layout.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Returns the first completion's message text.
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ComicError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let envelope: ApiErrorEnvelope = response.json().await.unwrap_or_default();
            return Err(ComicError::Response(
                envelope.message_or("Failed to generate custom HTML"),
            ));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ComicError::Response(e.to_string()))?;

        let first = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ComicError::Response("No completions returned".into()))?;

        Ok(first.message.content)
    }
}
