pub mod chat_client;
pub mod image_client;

use crate::{
    config::RunConfig,
    error::{ComicError, Result},
};

pub use chat_client::ChatClient;
pub use image_client::ImageClient;

/// Facade over the two endpoints the generator talks to: image edits
/// for the panels themselves and chat completions for the optional
/// custom HTML layout.
#[derive(Clone)]
pub struct OpenAiClient {
    image_client: ImageClient,
    chat_client: ChatClient,
}

impl OpenAiClient {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let api_key = config
            .api
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ComicError::Config("API key is required".into()))?;

        let base_url = config.api.base_url().trim_end_matches('/').to_string();
        let http = reqwest::Client::new();

        Ok(Self {
            image_client: ImageClient::new(
                http.clone(),
                base_url.clone(),
                api_key.to_string(),
                config.generation.clone(),
            ),
            chat_client: ChatClient::new(http, base_url, api_key.to_string()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }
}
