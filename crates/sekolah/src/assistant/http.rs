use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AssistantError, AssistantReply, AssistantRequest, TextAssistant};

/// Calls a hosted completion endpoint.
///
/// The endpoint receives `{"prompt", "response_schema"}` and answers with either
/// `{"json": ...}` or `{"text": "..."}`. Requests are blocking; async callers run them on the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    json: Option<Value>,
    #[serde(default)]
    text: Option<String>,
}

impl HttpAssistant {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextAssistant for HttpAssistant {
    fn complete(&self, request: &AssistantRequest) -> Result<AssistantReply, AssistantError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| AssistantError::Transport(err.to_string()))?;

        let mut call = client.post(&self.endpoint).json(&json!({
            "prompt": request.prompt,
            "response_schema": request.schema,
        }));
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .map_err(|err| AssistantError::Transport(err.to_string()))?;
        let status = response.status();
        debug!(status = status.as_u16(), "assistant responded");
        if !status.is_success() {
            return Err(AssistantError::Status(status.as_u16()));
        }

        let body: CompletionBody = response
            .json()
            .map_err(|err| AssistantError::InvalidPayload(err.to_string()))?;
        match body {
            CompletionBody {
                json: Some(value), ..
            } => Ok(AssistantReply::Json(value)),
            CompletionBody {
                text: Some(text), ..
            } => Ok(AssistantReply::Text(text)),
            _ => Err(AssistantError::InvalidPayload(
                "reply has neither json nor text".to_string(),
            )),
        }
    }
}
