//! Session-scoped state for one user interaction.
//!
//! A [`Session`] owns the validator, the analyzer and whatever credential the
//! user last entered. Nothing here is global; the front-end creates one
//! session and passes it around explicitly.

use crate::ai::{CredentialValidator, ImageAnalyzer};
use crate::models::{AnalysisResult, ClientHandle, ImageAsset, ImageFormat};
use crate::ValidationError;
use tracing::{info, warn};
use uuid::Uuid;

/// Where the session stands with respect to the API key.
#[derive(Debug, Clone)]
pub enum CredentialStatus {
    /// Nothing usable entered yet; the user should be prompted.
    NoCredential,
    Validated(ClientHandle),
    /// The last key was rejected; entering another one retries.
    ValidationFailed(ValidationError),
}

impl CredentialStatus {
    pub fn handle(&self) -> Option<&ClientHandle> {
        match self {
            CredentialStatus::Validated(handle) => Some(handle),
            _ => None,
        }
    }

    /// Message shown to the user for this status.
    pub fn message(&self) -> String {
        match self {
            CredentialStatus::NoCredential => ValidationError::CredentialMissing.to_string(),
            CredentialStatus::Validated(_) => "API Key validated successfully!".to_string(),
            CredentialStatus::ValidationFailed(err) => err.to_string(),
        }
    }
}

/// Raw file as received from the user.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    AwaitingCredential,
    AwaitingImage,
}

impl IdleReason {
    pub fn message(self) -> &'static str {
        match self {
            IdleReason::AwaitingCredential => {
                "Enter a valid Gemini API Key before uploading an image"
            }
            IdleReason::AwaitingImage => "Upload an image to generate detailed information",
        }
    }
}

/// Details about the uploaded file rendered beside the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub file_name: String,
    pub format: ImageFormat,
    pub byte_len: usize,
    pub dimensions: Option<(u32, u32)>,
}

impl ImageSummary {
    pub fn of(asset: &ImageAsset) -> Self {
        Self {
            file_name: asset.file_name().to_string(),
            format: asset.format(),
            byte_len: asset.len(),
            dimensions: asset.dimensions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub image: ImageSummary,
    pub result: AnalysisResult,
}

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Nothing to do yet.
    Idle(IdleReason),
    /// The upload was refused before analysis, e.g. for its extension.
    Rejected(String),
    /// Analysis ran; the result may be the fallback.
    Ready(AnalysisReport),
}

pub struct Session {
    id: Uuid,
    validator: Box<dyn CredentialValidator>,
    analyzer: Box<dyn ImageAnalyzer>,
    credential: CredentialStatus,
}

impl Session {
    pub fn new(validator: Box<dyn CredentialValidator>, analyzer: Box<dyn ImageAnalyzer>) -> Self {
        let id = Uuid::new_v4();
        info!("Starting session {}", id);
        Self {
            id,
            validator,
            analyzer,
            credential: CredentialStatus::NoCredential,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn credential_status(&self) -> &CredentialStatus {
        &self.credential
    }

    pub fn handle(&self) -> Option<&ClientHandle> {
        self.credential.handle()
    }

    /// Validates `input` and replaces the current credential status. Any
    /// previously validated handle is dropped, whatever the outcome.
    pub async fn submit_credential(&mut self, input: &str) -> &CredentialStatus {
        self.credential = match self.validator.validate(self.id, input).await {
            Ok(handle) => CredentialStatus::Validated(handle),
            Err(ValidationError::CredentialMissing) => CredentialStatus::NoCredential,
            Err(err) => {
                warn!("Credential rejected: {}", err);
                CredentialStatus::ValidationFailed(err)
            }
        };
        &self.credential
    }

    /// Analyzes `upload` with the session's handle.
    ///
    /// Analysis failures never invalidate the handle; the next upload is
    /// analyzed with the same credential.
    pub async fn analyze(&self, upload: Option<Upload>) -> AnalysisOutcome {
        let Some(handle) = self.credential.handle() else {
            return AnalysisOutcome::Idle(IdleReason::AwaitingCredential);
        };
        let Some(upload) = upload else {
            return AnalysisOutcome::Idle(IdleReason::AwaitingImage);
        };

        let asset = match ImageAsset::from_upload(upload.file_name, upload.bytes) {
            Ok(asset) => asset,
            Err(e) => {
                warn!("Upload rejected: {}", e);
                return AnalysisOutcome::Rejected(e.to_string());
            }
        };

        let image = ImageSummary::of(&asset);
        let result = self.analyzer.describe(handle, asset).await;
        if let Some(err) = result.error() {
            warn!(
                "Showing fallback for {} ({:?}); the API key stays validated",
                image.file_name,
                err.kind()
            );
        }
        AnalysisOutcome::Ready(AnalysisReport { image, result })
    }
}
