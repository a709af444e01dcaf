use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::interface::{
    ErrorBody, RawSpeechResponse, SpeechRequest, SpeechResponse, TranslateResponse, Translation,
    TranslationRequest, TranslationService,
};
use crate::error::{Endpoint, RequestError};

/// JSON-over-HTTP client for the translation server.
#[derive(Debug, Clone)]
pub struct HttpTranslationClient {
    client: Client,
    base_url: String,
}

/// Response of the `/test` probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub supported_languages: Option<usize>,
}

impl HttpTranslationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, RequestError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| transport(endpoint, e))?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            warn!("{} returned HTTP {}: {:?}", endpoint.path(), status, body.error);
            return Err(match body.error.filter(|m| !m.trim().is_empty()) {
                Some(message) => RequestError::Server {
                    status: status.as_u16(),
                    message,
                },
                None => RequestError::Status {
                    endpoint,
                    status: status.as_u16(),
                },
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RequestError::InvalidResponse {
            endpoint,
            detail: e.to_string(),
        })
    }

    /// Probe `GET /test`.
    pub async fn health_check(&self) -> Result<ServiceHealth, RequestError> {
        let endpoint = Endpoint::Health;
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .json::<ServiceHealth>()
            .await
            .map_err(|e| RequestError::InvalidResponse {
                endpoint,
                detail: e.to_string(),
            })
    }
}

fn transport(endpoint: Endpoint, err: reqwest::Error) -> RequestError {
    warn!("{} request failed: {}", endpoint.path(), err);
    RequestError::Transport {
        endpoint,
        detail: err.to_string(),
    }
}

#[async_trait]
impl TranslationService for HttpTranslationClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, RequestError> {
        let response: TranslateResponse = self
            .post_json(Endpoint::Translate, &request.to_body())
            .await?;
        debug!(
            "Translation received: {} chars, detected={:?}",
            response.translated_text.chars().count(),
            response.detected_language
        );
        Ok(response.into())
    }

    async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechResponse, RequestError> {
        let raw: RawSpeechResponse = self.post_json(Endpoint::TextToSpeech, request).await?;
        raw.into_response(request)
    }
}
