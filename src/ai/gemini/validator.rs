use super::client::GeminiHttpClient;
use crate::ai::CredentialValidator;
use crate::models::{ClientHandle, Credential};
use crate::{Error, Result, ValidationError};
use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

/// Validates a key by listing the models it can reach.
pub struct GeminiCredentialValidator {
    http: GeminiHttpClient,
}

impl GeminiCredentialValidator {
    pub fn new(http: GeminiHttpClient) -> Self {
        Self { http }
    }

    /// IDs of every listed model that supports `generateContent`, across all
    /// pages of the listing.
    async fn eligible_models(&self, credential: &Credential) -> Result<Vec<String>> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page = self
                .http
                .list_models_page(credential, page_token.as_deref())
                .await?;

            models.extend(
                page.models
                    .iter()
                    .filter(|m| m.supports_generation())
                    .map(|m| m.id().to_string()),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(Error::Invariant(format!(
                            "Model listing repeated page token {}",
                            token
                        )));
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(models)
    }
}

#[async_trait]
impl CredentialValidator for GeminiCredentialValidator {
    async fn validate(
        &self,
        session_id: Uuid,
        secret: &str,
    ) -> std::result::Result<ClientHandle, ValidationError> {
        let credential =
            Credential::from_input(secret).ok_or(ValidationError::CredentialMissing)?;

        tracing::info!("Validating Gemini API key ({} chars)", credential.len());

        let models = self.eligible_models(&credential).await.map_err(|e| {
            tracing::warn!("API key validation failed: {}", e);
            ValidationError::from(e)
        })?;

        let handle = ClientHandle::new(session_id, credential, models).ok_or_else(|| {
            tracing::warn!("API key reached no model supporting generateContent");
            ValidationError::NoEligibleModels
        })?;

        tracing::info!(
            "API key validated: {} models support generateContent",
            handle.models().len()
        );
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::ErrorKind;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_validator(server: &MockServer) -> GeminiCredentialValidator {
        GeminiCredentialValidator::new(GeminiHttpClient::new(server.uri(), None))
    }

    #[tokio::test]
    async fn test_empty_credential_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let validator = make_validator(&server);

        for input in ["", "   "] {
            let err = validator.validate(Uuid::new_v4(), input).await.unwrap_err();
            assert_eq!(err, ValidationError::CredentialMissing);
            assert_eq!(err.kind(), ErrorKind::CredentialMissing);
        }
    }

    #[tokio::test]
    async fn test_valid_key_returns_generation_models() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {
                        "name": "models/gemini-1.5-flash",
                        "supportedGenerationMethods": ["generateContent", "countTokens"]
                    },
                    {
                        "name": "models/text-embedding-004",
                        "supportedGenerationMethods": ["embedContent"]
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session_id = Uuid::new_v4();
        let handle = make_validator(&server)
            .validate(session_id, "valid-key")
            .await
            .unwrap();

        let models: Vec<&str> = handle.models().iter().map(String::as_str).collect();
        assert_eq!(models, vec!["gemini-1.5-flash"]);
        assert_eq!(handle.session_id(), session_id);
        assert_eq!(handle.credential().expose(), "valid-key");
    }

    #[tokio::test]
    async fn test_follows_page_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{
                    "name": "models/gemini-1.5-pro",
                    "supportedGenerationMethods": ["generateContent"]
                }],
                "nextPageToken": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{
                    "name": "models/gemini-1.5-flash",
                    "supportedGenerationMethods": ["generateContent"]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = make_validator(&server)
            .validate(Uuid::new_v4(), "valid-key")
            .await
            .unwrap();

        assert_eq!(handle.models().len(), 2);
        assert!(handle.supports("gemini-1.5-flash"));
        assert!(handle.supports("gemini-1.5-pro"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_invalid_credential() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let err = make_validator(&server)
            .validate(Uuid::new_v4(), "bad-key")
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::CredentialInvalid(ref msg) if msg.contains("API key not valid")));
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_no_generation_models_is_invalid_credential() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{
                    "name": "models/text-embedding-004",
                    "supportedGenerationMethods": ["embedContent"]
                }]
            })))
            .mount(&server)
            .await;

        let err = make_validator(&server)
            .validate(Uuid::new_v4(), "valid-key")
            .await
            .unwrap_err();

        assert_eq!(err, ValidationError::NoEligibleModels);
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let err = make_validator(&server)
            .validate(Uuid::new_v4(), "valid-key")
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::Transport(ref msg) if msg.contains("backend unavailable")));
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }

    #[tokio::test]
    async fn test_key_unfit_for_header_is_invalid_credential() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let validator = make_validator(&server);
        let err = validator
            .validate(Uuid::new_v4(), "AIza\nsplit-key")
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::CredentialInvalid(_)));
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let validator = GeminiCredentialValidator::new(GeminiHttpClient::new(uri, None));
        let err = validator
            .validate(Uuid::new_v4(), "valid-key")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }

    #[tokio::test]
    async fn test_repeated_page_token_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(test_support::LIST_MODELS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [],
                "nextPageToken": "same"
            })))
            .mount(&server)
            .await;

        let err = make_validator(&server)
            .validate(Uuid::new_v4(), "valid-key")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportFailure);
    }
}
