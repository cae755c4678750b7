use super::{CredentialValidator, ImageAnalyzer};
use crate::models::{ClientHandle, Credential, ImageAsset};
use crate::{AnalysisError, ValidationError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Validator that accepts any non-blank key and reports a fixed model list.
pub struct MockValidator {
    models: Vec<String>,
    failure: Arc<Mutex<Option<ValidationError>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockValidator {
    pub fn new() -> Self {
        Self {
            models: vec![crate::models::DEFAULT_MODEL.to_string()],
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn with_failure(self, failure: Option<ValidationError>) -> Self {
        *self.failure.lock().unwrap() = failure;
        self
    }

    /// Changes the outcome of later calls.
    pub fn set_failure(&self, failure: Option<ValidationError>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Number of validations that would have reached the provider.
    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialValidator for MockValidator {
    async fn validate(
        &self,
        session_id: Uuid,
        secret: &str,
    ) -> Result<ClientHandle, ValidationError> {
        let credential =
            Credential::from_input(secret).ok_or(ValidationError::CredentialMissing)?;

        *self.call_count.lock().unwrap() += 1;

        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return Err(failure);
        }

        ClientHandle::new(session_id, credential, self.models.clone())
            .ok_or(ValidationError::NoEligibleModels)
    }
}

/// Analyzer that replays canned responses in order, cycling when exhausted.
pub struct MockAnalyzer {
    responses: Arc<Mutex<Vec<Result<String, AnalysisError>>>>,
    call_count: Arc<Mutex<usize>>,
    seen_files: Arc<Mutex<Vec<String>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            seen_files: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    pub fn with_failure(self, failure: AnalysisError) -> Self {
        self.responses.lock().unwrap().push(Err(failure));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// File names of every image handed to the analyzer, in call order.
    pub fn seen_files(&self) -> Vec<String> {
        self.seen_files.lock().unwrap().clone()
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        _handle: &ClientHandle,
        image: ImageAsset,
    ) -> Result<String, AnalysisError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.seen_files
            .lock()
            .unwrap()
            .push(image.file_name().to_string());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(format!(
                "A {} image named {}",
                image.format().label(),
                image.file_name()
            ))
        } else {
            let index = (*count - 1) % responses.len();
            responses[index].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::FALLBACK_MESSAGE;

    fn asset(name: &str) -> ImageAsset {
        ImageAsset::from_upload(name, vec![0xFF, 0xD8, 0xFF]).unwrap()
    }

    #[tokio::test]
    async fn test_mock_validator_blank_input_is_not_counted() {
        let validator = MockValidator::new();

        let err = validator.validate(Uuid::new_v4(), "").await.unwrap_err();
        assert_eq!(err, ValidationError::CredentialMissing);
        assert_eq!(validator.get_call_count(), 0);

        let handle = validator.validate(Uuid::new_v4(), "key").await.unwrap();
        assert!(handle.supports("gemini-1.5-flash"));
        assert_eq!(validator.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_validator_failure_and_empty_models() {
        let validator = MockValidator::new().with_failure(Some(
            ValidationError::CredentialInvalid("rejected".to_string()),
        ));
        assert!(validator.validate(Uuid::new_v4(), "key").await.is_err());

        let empty = MockValidator::new().with_models(Vec::new());
        assert_eq!(
            empty.validate(Uuid::new_v4(), "key").await.unwrap_err(),
            ValidationError::NoEligibleModels
        );
    }

    #[tokio::test]
    async fn test_mock_analyzer_cycles_responses() {
        let validator = MockValidator::new();
        let handle = validator.validate(Uuid::new_v4(), "key").await.unwrap();
        let analyzer = MockAnalyzer::new()
            .with_response("First".to_string())
            .with_failure(AnalysisError::Decode("bad".to_string()));

        assert_eq!(analyzer.describe(&handle, asset("a.jpg")).await.text(), "First");
        assert_eq!(
            analyzer.describe(&handle, asset("b.jpg")).await.text(),
            FALLBACK_MESSAGE
        );
        assert_eq!(analyzer.describe(&handle, asset("c.jpg")).await.text(), "First");

        assert_eq!(analyzer.get_call_count(), 3);
        assert_eq!(analyzer.seen_files(), vec!["a.jpg", "b.jpg", "c.jpg"]);
    }
}
