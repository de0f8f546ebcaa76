//! Generative-text helper used by the back office for news drafts and roster narratives.

pub mod http;
pub mod router;

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::workflows::ppdb::StatusSummary;

pub use http::HttpAssistant;
pub use router::{assistant_router, AssistantState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantRequest {
    pub prompt: String,
    /// JSON schema the reply must follow. `None` asks for free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    Text(String),
    Json(Value),
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant endpoint is not configured")]
    NotConfigured,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("assistant request failed: {0}")]
    Transport(String),
    #[error("assistant returned status {0}")]
    Status(u16),
    #[error("assistant reply could not be used: {0}")]
    InvalidPayload(String),
}

/// A text-generation backend.
pub trait TextAssistant: Send + Sync {
    fn complete(&self, request: &AssistantRequest) -> Result<AssistantReply, AssistantError>;
}

/// Structured article proposal for the news editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
}

pub fn news_draft_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "content": { "type": "string" },
            "excerpt": { "type": "string" },
            "seo_keywords": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["title", "content", "excerpt", "seo_keywords"]
    })
}

pub fn draft_news_article(
    assistant: &dyn TextAssistant,
    topic: &str,
) -> Result<NewsDraft, AssistantError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(AssistantError::EmptyPrompt);
    }

    let request = AssistantRequest {
        prompt: format!(
            "Tulis artikel berita sekolah dalam Bahasa Indonesia tentang: {topic}. \
             Sertakan judul, isi artikel, ringkasan singkat, dan kata kunci SEO."
        ),
        schema: Some(news_draft_schema()),
    };

    let draft: NewsDraft = match assistant.complete(&request)? {
        AssistantReply::Json(value) => serde_json::from_value(value),
        AssistantReply::Text(text) => serde_json::from_str(text.trim()),
    }
    .map_err(|err| AssistantError::InvalidPayload(err.to_string()))?;

    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(AssistantError::InvalidPayload(
            "draft is missing a title or content".to_string(),
        ));
    }
    Ok(draft)
}

/// One-paragraph narrative over the applicant counts.
pub fn summarize_with_assistant(
    assistant: &dyn TextAssistant,
    summary: &StatusSummary,
) -> Result<String, AssistantError> {
    let request = AssistantRequest {
        prompt: summary.narrative_prompt(),
        schema: None,
    };
    let text = match assistant.complete(&request)? {
        AssistantReply::Text(text) => text,
        AssistantReply::Json(value) => value
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AssistantError::InvalidPayload("reply has no text".to_string()))?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AssistantError::InvalidPayload("reply is empty".to_string()));
    }
    Ok(text.to_string())
}

/// Used when no endpoint is configured. Every call fails with [`AssistantError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAssistant;

impl TextAssistant for UnconfiguredAssistant {
    fn complete(&self, _request: &AssistantRequest) -> Result<AssistantReply, AssistantError> {
        Err(AssistantError::NotConfigured)
    }
}

/// Replays queued replies in order and records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedAssistant {
    replies: Mutex<VecDeque<Result<AssistantReply, AssistantError>>>,
    requests: Mutex<Vec<AssistantRequest>>,
}

impl ScriptedAssistant {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<AssistantReply, AssistantError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<AssistantRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

impl TextAssistant for ScriptedAssistant {
    fn complete(&self, request: &AssistantRequest) -> Result<AssistantReply, AssistantError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::Transport("no scripted reply left".to_string())))
    }
}
