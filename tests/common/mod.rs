#![allow(dead_code)]

use async_trait::async_trait;
use card_scan::core::InferenceBackend;
use card_scan::domain::model::{InferenceRequest, InferenceResponse};
use card_scan::BackendError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned behaviour of one model identifier.
pub enum Reply {
    Text(&'static str, u64),
    Quota,
    ServerError,
}

/// In-memory backend answering per model and recording the call order.
pub struct ScriptedBackend {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<(&str, Reply)>) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .into_iter()
                .map(|(model, reply)| (model.to_string(), reply))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn generate(
        &self,
        model: &str,
        _request: &InferenceRequest,
    ) -> Result<InferenceResponse, BackendError> {
        self.calls.lock().unwrap().push(model.to_string());
        match self.replies.get(model) {
            Some(Reply::Text(text, tokens)) => Ok(InferenceResponse {
                text: text.to_string(),
                tokens_used: *tokens,
            }),
            Some(Reply::Quota) => Err(BackendError::QuotaExceeded {
                message: "Resource has been exhausted".to_string(),
            }),
            Some(Reply::ServerError) | None => Err(BackendError::Http {
                status: 500,
                body: "internal error".to_string(),
            }),
        }
    }
}

pub fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Body of a successful `generateContent` reply.
pub fn gemini_reply(text: &str, total_tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": total_tokens / 2,
            "candidatesTokenCount": total_tokens - total_tokens / 2,
            "totalTokenCount": total_tokens
        }
    })
}

pub fn gemini_quota_error() -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }
    })
}
