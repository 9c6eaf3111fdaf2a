use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::{
    config::GenerationConfig,
    error::{ComicError, Result},
    models::{ApiErrorEnvelope, ImageEditResponse, PanelRequest},
    pipeline::PanelGenerator,
};

const GENERIC_FAILURE: &str = "API request failed";

/// Client for POST {base_url}/images/edits. One request per panel,
/// always seeded with the same uploaded reference image.
#[derive(Clone)]
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    generation: GenerationConfig,
}

impl ImageClient {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            generation,
        }
    }

    /// Issues one image-edit request and returns the base64 payload of
    /// the first generated image.
    pub async fn edit(&self, request: &PanelRequest) -> Result<String> {
        let image_part = Part::bytes(request.reference_image.as_ref().clone())
            .file_name("input.png");

        let form = Form::new()
            .part("image", image_part)
            .text("prompt", request.prompt.clone())
            .text("model", self.generation.model.clone())
            .text("input_fidelity", self.generation.input_fidelity.clone())
            .text("quality", self.generation.quality.clone())
            .text("output_format", self.generation.output_format.clone());

        log::debug!(
            "Requesting panel {}/{} with model {}",
            request.position,
            request.total,
            self.generation.model
        );

        let response = self
            .client
            .post(format!("{}/images/edits", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ComicError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let envelope: ApiErrorEnvelope = response.json().await.unwrap_or_default();
            return Err(ComicError::Response(envelope.message_or(GENERIC_FAILURE)));
        }

        let body: ImageEditResponse = response
            .json()
            .await
            .map_err(|e| ComicError::Response(e.to_string()))?;

        let first = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ComicError::Response("No images generated".into()))?;

        Ok(first.b64_json)
    }
}

#[async_trait]
impl PanelGenerator for ImageClient {
    async fn generate(&self, request: &PanelRequest) -> Result<String> {
        self.edit(request).await
    }
}
