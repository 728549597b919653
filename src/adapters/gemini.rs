use crate::domain::model::{InferenceRequest, InferenceResponse};
use crate::domain::ports::InferenceBackend;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";

/// `generateContent` client for Gemini vision models.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u64>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    status: Option<String>,
    message: Option<String>,
}

/// Maps a non-success reply onto the backend error taxonomy. The structured
/// `error.status` field wins; plain-text bodies are inspected only as a fallback.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> BackendError {
    let quota = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            status == StatusCode::TOO_MANY_REQUESTS
                || envelope.error.status.as_deref() == Some(QUOTA_STATUS)
        }
        Err(_) => {
            status == StatusCode::TOO_MANY_REQUESTS
                || body.contains(QUOTA_STATUS)
                || body.to_ascii_lowercase().contains("quota")
        }
    };

    if quota {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or_else(|| body.to_string());
        BackendError::QuotaExceeded { message }
    } else {
        BackendError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        }
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, BackendError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [
                { "text": request.prompt },
                { "inlineData": {
                    "mimeType": request.mime_type,
                    "data": STANDARD.encode(&request.image)
                } }
            ]}]
        });

        tracing::debug!("POST {} ({} image bytes)", self.url(model), request.image.len());

        let response = self
            .client
            .post(self.url(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Gemini response status: {}", status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let text = response.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::InvalidResponse {
                message: e.to_string(),
            })?;

        let answer = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "response contains no candidate content".to_string(),
            })?;

        let tokens_used = parsed
            .usage_metadata
            .and_then(|usage| usage.total_token_count)
            .unwrap_or(0);

        Ok(InferenceResponse {
            text: answer,
            tokens_used,
        })
    }
}
