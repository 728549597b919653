use crate::core::session::{Session, SessionSummary};
use crate::core::strategy::InvocationStrategy;
use crate::core::{ConfigProvider, InferenceBackend, Storage};
use crate::export;
use crate::utils::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// MIME type sent with an image, derived from its extension.
pub fn mime_type_for(path: &str) -> Result<&'static str> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        _ => Err(ScanError::UnsupportedImage {
            path: path.to_string(),
        }),
    }
}

/// Expands `{timestamp}` in an output file stem.
pub fn resolve_file_stem(stem: &str, now: DateTime<Utc>) -> String {
    stem.replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub processed: Vec<String>,
    pub failures: Vec<ImageFailure>,
    pub summary: SessionSummary,
    pub outputs: Vec<String>,
}

/// Scans a batch of images into one session and writes the configured exports.
pub struct ScanEngine<S: Storage, C: ConfigProvider> {
    session: Session,
    input: S,
    output: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ScanEngine<S, C> {
    pub fn new(session: Session, input: S, output: S, config: C) -> Self {
        Self {
            session,
            input,
            output,
            config,
        }
    }

    /// Builds the invocation strategy from the configuration.
    pub fn from_config(backend: Arc<dyn InferenceBackend>, input: S, output: S, config: C) -> Self {
        let strategy = InvocationStrategy::new(backend, config.models().to_vec())
            .with_timeout(config.timeout())
            .with_prompt(config.prompt());
        Self::new(Session::new(strategy), input, output, config)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    async fn scan_image(&mut self, path: &str) -> Result<usize> {
        let mime_type = mime_type_for(path)?;
        let image = self.input.read_file(path).await?;
        let extraction = self.session.extract(&image, mime_type).await?;
        Ok(extraction.records.len())
    }

    pub async fn run(&mut self, images: &[String]) -> Result<ScanReport> {
        let started_at = Utc::now();
        let mut processed = Vec::new();
        let mut failures = Vec::new();

        tracing::info!("Scanning {} image(s)", images.len());

        for path in images {
            match self.scan_image(path).await {
                Ok(count) => {
                    tracing::info!("{}: {} contact(s) extracted", path, count);
                    processed.push(path.clone());
                }
                Err(e) => {
                    tracing::warn!("{}: extraction failed: {}", path, e);
                    if let Some(raw) = e.raw_response() {
                        tracing::debug!("{}: raw model response: {}", path, raw);
                    }
                    failures.push(ImageFailure {
                        path: path.clone(),
                        message: e.user_friendly_message(),
                    });
                }
            }
        }

        let outputs = self.export(started_at).await?;

        Ok(ScanReport {
            started_at,
            processed,
            failures,
            summary: self.session.summary(),
            outputs,
        })
    }

    /// Writes every configured format for the current contact list.
    pub async fn export(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let stem = resolve_file_stem(self.config.file_stem(), now);
        let records = self.session.records();
        let mut outputs = Vec::new();

        for format in self.config.formats() {
            let data = export::export(*format, records, self.config.include_header())?;
            let file_name = format.file_name(&stem);
            tracing::debug!("Writing {} ({} bytes)", file_name, data.len());
            self.output.write_file(&file_name, &data).await?;
            outputs.push(format!("{}/{}", self.config.output_path(), file_name));
        }

        tracing::info!(
            "Exported {} contact(s) as {}",
            records.len(),
            self.config
                .formats()
                .iter()
                .map(|format| format.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(outputs)
    }
}
