//! HTTP client for the Kanji OCR API.
//!
//! Provides a small reqwest client with generic GET/POST helpers and domain
//! methods (upload, lookup, chat, health), plus the client-side state machines
//! that drive an upload and a character lookup and the session drivers that
//! run them against a backend.

pub mod api;
pub mod banner;
pub mod error;
pub mod lookup_flow;
pub mod session;
pub mod ticket;
pub mod upload_flow;

pub use api::SelectedFile;
pub use banner::Banner;
pub use error::ClientError;
pub use lookup_flow::{LookupFlow, LookupPhase};
pub use session::{ClientState, KanjiBackend, LookupSession, LookupUnavailable, UploadSession};
pub use ticket::Ticket;
pub use upload_flow::{SelectRejected, UploadFlow, UploadPhase};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default base URL when `KANJI_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// HTTP client for the Kanji OCR API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(60))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: KANJI_API_URL (or API_URL).
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("KANJI_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request. Deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST json");
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "POST multipart");
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_response(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), error = %err, "API request failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
