use crate::core::normalizer::normalize_all;
use crate::core::parser::parse_response;
use crate::domain::model::{Extraction, InferenceRequest};
use crate::domain::ports::InferenceBackend;
use crate::utils::error::{Result, ScanError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PROMPT: &str = "Extract the contact details of every business card visible in this image. \
Answer with a JSON list containing one object per card and nothing else. \
Each object must use exactly these keys: Firma, Name, Vorname, Abteilung, Adresse, Telefon, Mobil, Email, URL. \
Name is the surname, Vorname the given name, Telefon the landline and Mobil the mobile number. \
Use null for any field that is not printed on the card.";

/// Runs one extraction against an ordered list of interchangeable models.
///
/// Only quota failures move on to the next candidate; every other failure is
/// returned as is. Parsing and normalization happen before anything is
/// returned, so a caller either gets a complete extraction or nothing.
pub struct InvocationStrategy {
    backend: Arc<dyn InferenceBackend>,
    candidates: Vec<String>,
    timeout: Duration,
    prompt: String,
}

impl InvocationStrategy {
    pub fn new(backend: Arc<dyn InferenceBackend>, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
            timeout: DEFAULT_TIMEOUT,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub async fn extract(&self, image: &[u8], mime_type: &str) -> Result<Extraction> {
        let request = InferenceRequest {
            image: image.to_vec(),
            mime_type: mime_type.to_string(),
            prompt: self.prompt.clone(),
        };
        let mut attempted = Vec::with_capacity(self.candidates.len());

        for model in &self.candidates {
            attempted.push(model.clone());
            tracing::debug!("Invoking model {} ({} bytes, {})", model, image.len(), mime_type);

            let outcome = tokio::time::timeout(self.timeout, self.backend.generate(model, &request))
                .await
                .map_err(|_| ScanError::Timeout {
                    model: model.clone(),
                    seconds: self.timeout.as_secs(),
                })?;

            match outcome {
                Ok(response) => {
                    let untyped = parse_response(&response.text)?;
                    let records = normalize_all(&untyped);
                    tracing::info!(
                        "Model {} returned {} contact(s), {} tokens",
                        model,
                        records.len(),
                        response.tokens_used
                    );
                    return Ok(Extraction {
                        records,
                        tokens_used: response.tokens_used,
                        model: model.clone(),
                    });
                }
                Err(e) if e.is_quota() => {
                    tracing::warn!("Model {} is rate limited, trying next candidate: {}", model, e);
                }
                Err(e) => {
                    return Err(ScanError::BackendFailure {
                        model: model.clone(),
                        source: e,
                    });
                }
            }
        }

        Err(ScanError::AllBackendsExhausted { attempted })
    }
}
