use serde::{Deserialize, Serialize};

/// Success body of POST {base_url}/images/edits.
#[derive(Debug, Deserialize)]
pub struct ImageEditResponse {
    pub data: Vec<ImageEditDatum>,
}

#[derive(Debug, Deserialize)]
pub struct ImageEditDatum {
    pub b64_json: String,
}

/// Error body the endpoints return on non-2xx. Every field is
/// optional; a missing message yields a generic failure text.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

impl ApiErrorEnvelope {
    pub fn message_or(self, fallback: &str) -> String {
        self.error
            .and_then(|e| e.message)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: String,
}
