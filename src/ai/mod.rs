//! Gemini integration for credential validation and image analysis
//!
//! Both operations sit behind traits so the session can be driven by the
//! real REST clients or by the mocks in [`mock`].

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiCredentialValidator, GeminiHttpClient, GeminiImageAnalyzer};
pub use mock::{MockAnalyzer, MockValidator};

use crate::models::{AnalysisResult, ClientHandle, ImageAsset};
use crate::{AnalysisError, ValidationError};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Checks `secret` against the provider and returns a handle scoped to
    /// `session_id`. Blank input yields [`ValidationError::CredentialMissing`]
    /// without contacting the provider.
    async fn validate(
        &self,
        session_id: Uuid,
        secret: &str,
    ) -> Result<ClientHandle, ValidationError>;
}

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        handle: &ClientHandle,
        image: ImageAsset,
    ) -> Result<String, AnalysisError>;

    /// Like [`ImageAnalyzer::analyze`], but a failure becomes the fallback
    /// result instead of an error.
    async fn describe(&self, handle: &ClientHandle, image: ImageAsset) -> AnalysisResult {
        let file_name = image.file_name().to_string();
        match self.analyze(handle, image).await {
            Ok(text) => AnalysisResult::Text(text),
            Err(e) => {
                tracing::error!(
                    "An error occurred during image analysis of {}: {}",
                    file_name,
                    e
                );
                AnalysisResult::Fallback(e)
            }
        }
    }
}
