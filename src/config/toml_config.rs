use crate::adapters::gemini::DEFAULT_ENDPOINT;
use crate::config::{validate_settings, DEFAULT_FILE_STEM, DEFAULT_TIMEOUT_SECONDS};
use crate::core::strategy::DEFAULT_PROMPT;
use crate::core::ConfigProvider;
use crate::export::ExportFormat;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub inference: InferenceConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub endpoint: Option<String>,
    pub api_key: String,
    pub models: Vec<String>,
    pub timeout_seconds: Option<u64>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<ExportFormat>,
    pub include_header: Option<bool>,
    pub file_stem: Option<String>,
}

impl ScanConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` placeholders; unset variables are left as they are.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Command line flags win over file values.
    #[cfg(feature = "cli")]
    pub fn apply_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(endpoint) = &cli.endpoint {
            self.inference.endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &cli.api_key {
            self.inference.api_key = api_key.clone();
        }
        if !cli.models.is_empty() {
            self.inference.models = cli.models.clone();
        }
        if let Some(timeout) = cli.timeout_seconds {
            self.inference.timeout_seconds = Some(timeout);
        }
        if let Some(output_path) = &cli.output_path {
            self.export.output_path = output_path.clone();
        }
        if !cli.formats.is_empty() {
            self.export.formats = cli.formats.clone();
        }
        if cli.no_header {
            self.export.include_header = Some(false);
        }
        if let Some(file_stem) = &cli.file_stem {
            self.export.file_stem = Some(file_stem.clone());
        }
    }
}

impl ConfigProvider for ScanConfig {
    fn endpoint(&self) -> &str {
        self.inference.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn api_key(&self) -> &str {
        &self.inference.api_key
    }

    fn models(&self) -> &[String] {
        &self.inference.models
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.inference
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    fn prompt(&self) -> &str {
        self.inference.prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn formats(&self) -> &[ExportFormat] {
        &self.export.formats
    }

    fn include_header(&self) -> bool {
        self.export.include_header.unwrap_or(true)
    }

    fn file_stem(&self) -> &str {
        self.export.file_stem.as_deref().unwrap_or(DEFAULT_FILE_STEM)
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key().contains("${") {
            return Err(ScanError::MissingConfigError {
                field: format!("environment variable in inference.api_key ({})", self.api_key()),
            });
        }
        validate_settings(self)
    }
}
