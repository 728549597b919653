pub mod engine;
pub mod normalizer;
pub mod parser;
pub mod session;
pub mod store;
pub mod strategy;

pub use crate::domain::model::{ContactRecord, Extraction, Field, UntypedRecord, SCHEMA};
pub use crate::domain::ports::{ConfigProvider, InferenceBackend, Storage};
pub use crate::utils::error::Result;
