pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::GeminiBackend;
pub use config::{cli::LocalStorage, toml_config::ScanConfig};
pub use core::{
    engine::{ScanEngine, ScanReport},
    session::Session,
    store::{ContactStore, UsageLedger},
    strategy::InvocationStrategy,
};
pub use domain::model::{ContactRecord, Field, SCHEMA};
pub use export::ExportFormat;
pub use utils::error::{BackendError, Result, ScanError};
