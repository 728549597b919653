use crate::domain::model::{InferenceRequest, InferenceResponse};
use crate::export::ExportFormat;
use crate::utils::error::{BackendError, Result};
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn models(&self) -> &[String];
    fn timeout(&self) -> Duration;
    fn prompt(&self) -> &str;
    fn output_path(&self) -> &str;
    fn formats(&self) -> &[ExportFormat];
    fn include_header(&self) -> bool;
    fn file_stem(&self) -> &str;
}

/// Remote multimodal model: image and instruction in, text out.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> std::result::Result<InferenceResponse, BackendError>;
}
