pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_path, validate_range,
    validate_url,
};

pub const DEFAULT_MODELS: [&str; 2] = ["gemini-2.0-flash", "gemini-1.5-flash"];
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_FILE_STEM: &str = "kontakte";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Checks shared by every configuration source.
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("inference.endpoint", config.endpoint())?;
    validate_non_empty_string("inference.api_key", config.api_key())?;
    validate_non_empty_list("inference.models", config.models())?;
    for model in config.models() {
        validate_non_empty_string("inference.models", model)?;
    }
    validate_range(
        "inference.timeout_seconds",
        config.timeout().as_secs(),
        1,
        600,
    )?;
    validate_path("export.output_path", config.output_path())?;
    validate_non_empty_list("export.formats", config.formats())?;
    validate_non_empty_string("export.file_stem", config.file_stem())?;
    Ok(())
}

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::*;
    use crate::adapters::gemini::DEFAULT_ENDPOINT;
    use crate::core::strategy::DEFAULT_PROMPT;
    use crate::export::ExportFormat;
    use crate::utils::validation::{validate_file_extensions, Validate, IMAGE_EXTENSIONS};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    const DEFAULT_FORMATS: &[ExportFormat] = &[ExportFormat::Csv];

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "card-scan")]
    #[command(about = "Extract contacts from business card images")]
    pub struct CliConfig {
        /// Card images (.jpg, .jpeg, .png), relative to the current directory
        #[arg(required = true)]
        pub images: Vec<String>,

        /// TOML configuration file; flags given here override its values
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long)]
        pub endpoint: Option<String>,

        /// Falls back to the GEMINI_API_KEY environment variable
        #[arg(long)]
        pub api_key: Option<String>,

        /// Candidate models in fallback order
        #[arg(long, value_delimiter = ',')]
        pub models: Vec<String>,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// Any of csv, tsv, vcf, vcf-zip
        #[arg(long, value_delimiter = ',')]
        pub formats: Vec<ExportFormat>,

        /// Omit the header row of csv/tsv exports
        #[arg(long)]
        pub no_header: bool,

        /// Output file name without extension; `{timestamp}` is expanded
        #[arg(long)]
        pub file_stem: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(skip)]
        #[serde(default)]
        default_models: Vec<String>,

        #[arg(skip)]
        #[serde(default)]
        env_api_key: Option<String>,
    }

    impl CliConfig {
        /// Fills values that come from the environment rather than flags.
        pub fn resolve_env(mut self) -> Self {
            self.env_api_key = std::env::var(API_KEY_ENV).ok();
            self.default_models = DEFAULT_MODELS.iter().map(|m| m.to_string()).collect();
            self
        }
    }

    impl ConfigProvider for CliConfig {
        fn endpoint(&self) -> &str {
            self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
        }

        fn api_key(&self) -> &str {
            self.api_key
                .as_deref()
                .or(self.env_api_key.as_deref())
                .unwrap_or("")
        }

        fn models(&self) -> &[String] {
            if self.models.is_empty() {
                &self.default_models
            } else {
                &self.models
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
        }

        fn prompt(&self) -> &str {
            DEFAULT_PROMPT
        }

        fn output_path(&self) -> &str {
            self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
        }

        fn formats(&self) -> &[ExportFormat] {
            if self.formats.is_empty() {
                DEFAULT_FORMATS
            } else {
                &self.formats
            }
        }

        fn include_header(&self) -> bool {
            !self.no_header
        }

        fn file_stem(&self) -> &str {
            self.file_stem.as_deref().unwrap_or(DEFAULT_FILE_STEM)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_file_extensions("images", &self.images, IMAGE_EXTENSIONS)?;
            validate_settings(self)
        }
    }

}
