use super::types::{ApiErrorEnvelope, ListModelsResponse};
use crate::models::Credential;
use crate::{Error, Result};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Largest page the models listing accepts.
const LIST_MODELS_PAGE_SIZE: u32 = 1000;

/// Lightweight Gemini REST client shared by the validator and the analyzer.
///
/// The API key is supplied per call so one client (and its connection pool)
/// can serve whatever credential the session currently holds.
#[derive(Clone)]
pub struct GeminiHttpClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(base_url, timeout, Client::new())
    }

    pub fn new_with_client(base_url: String, timeout: Option<Duration>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<Resp: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<Resp> {
        let mut key =
            HeaderValue::from_str(credential.expose()).map_err(|_| Error::MalformedKey)?;
        key.set_sensitive(true);

        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request
            .header("x-goog-api-key", key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&error_text),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::Parse(e.to_string())
        })
    }

    /// Fetches one page of `GET /v1beta/models`.
    pub async fn list_models_page(
        &self,
        credential: &Credential,
        page_token: Option<&str>,
    ) -> Result<ListModelsResponse> {
        let url = format!("{}/v1beta/models", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("pageSize", LIST_MODELS_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        tracing::debug!("Listing Gemini models (page token: {:?})", page_token);
        self.send(request, credential).await
    }

    /// Calls Gemini's `generateContent` endpoint for `model`.
    ///
    /// `model` may be given with or without the `models/` prefix.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        credential: &Credential,
        model: &str,
        request: &Req,
    ) -> Result<Resp> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);

        self.send(request, credential).await
    }
}

/// Pulls `error.message` out of a Google error body, falling back to the raw
/// text when the body is not the standard envelope.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{} ({})", envelope.error.message, status),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}
