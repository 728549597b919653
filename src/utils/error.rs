use thiserror::Error;

/// Failure reported by an inference backend for a single model call.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response envelope: {message}")]
    InvalidResponse { message: String },
}

impl BackendError {
    /// Only throttling failures are eligible for fallback to the next candidate.
    pub fn is_quota(&self) -> bool {
        matches!(self, BackendError::QuotaExceeded { .. })
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Model '{model}' failed: {source}")]
    BackendFailure {
        model: String,
        #[source]
        source: BackendError,
    },

    #[error("Model '{model}' timed out after {seconds}s")]
    Timeout { model: String, seconds: u64 },

    #[error("All backends exhausted (tried: {})", .attempted.join(", "))]
    AllBackendsExhausted { attempted: Vec<String> },

    #[error("Index {index} out of range (store holds {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unsupported image '{path}'")]
    UnsupportedImage { path: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Inference,
    Response,
    Session,
    Export,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::BackendFailure { .. }
            | ScanError::Timeout { .. }
            | ScanError::AllBackendsExhausted { .. } => ErrorCategory::Inference,
            ScanError::MalformedResponse { .. } => ErrorCategory::Response,
            ScanError::IndexOutOfRange { .. } | ScanError::InvalidInput { .. } => {
                ErrorCategory::Session
            }
            ScanError::ZipError(_) | ScanError::CsvError(_) => ErrorCategory::Export,
            ScanError::ConfigError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::UnsupportedImage { .. } => ErrorCategory::Configuration,
            ScanError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScanError::IndexOutOfRange { .. } => ErrorSeverity::Low,
            ScanError::AllBackendsExhausted { .. }
            | ScanError::Timeout { .. }
            | ScanError::MalformedResponse { .. } => ErrorSeverity::Medium,
            ScanError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// The raw model text, when the failure came from decoding it.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ScanError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScanError::MalformedResponse { .. } => {
                "Inspect the raw model output and scan the card again".to_string()
            }
            ScanError::AllBackendsExhausted { .. } => {
                "Every model is rate limited; wait a moment and retry the whole scan".to_string()
            }
            ScanError::Timeout { .. } => {
                "Increase timeout_seconds or retry with a smaller image".to_string()
            }
            ScanError::BackendFailure { .. } => {
                "Check the endpoint, API key and network connection".to_string()
            }
            ScanError::IndexOutOfRange { .. } => {
                "Refresh the contact list and pick a displayed row".to_string()
            }
            ScanError::InvalidInput { .. } => {
                "Keep the header row of the exported table when editing it".to_string()
            }
            ScanError::UnsupportedImage { .. } => {
                "Use a .jpg, .jpeg or .png image".to_string()
            }
            ScanError::ConfigError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags".to_string()
            }
            ScanError::ZipError(_) | ScanError::CsvError(_) => {
                "Retry the export; the contact list is unchanged".to_string()
            }
            ScanError::IoError(_) => "Check file permissions and free disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::MalformedResponse { raw, .. } => {
                format!("The model answer could not be read:\n{}", raw)
            }
            ScanError::AllBackendsExhausted { .. } => {
                "All models are over quota, nothing was added".to_string()
            }
            ScanError::IndexOutOfRange { index, .. } => {
                format!("There is no contact at position {}", index)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
