// src/fetch/http.rs

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::fetch::normalize::normalize_body;
use crate::fetch::{FailureKind, FetchError, FetchFuture, FetchSettings, Fetcher};
use crate::types::Fingerprint;

/// Fetcher backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn fetch_inner(&self, url: &str) -> Result<Fingerprint, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(FetchError::new(
                FailureKind::TooLarge { max_bytes },
                "declared content length over limit",
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge { max_bytes },
                    "body over limit",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = String::from_utf8(bytes)
            .map_err(|err| FetchError::new(FailureKind::ParseFailure, err.to_string()))?;

        let normalized = normalize_body(&body, content_type.as_deref());
        let fingerprint = Fingerprint::of_content(&normalized);
        debug!(
            url = %url,
            bytes = body.len(),
            normalized_len = normalized.len(),
            fingerprint = %fingerprint,
            "fetched page"
        );
        Ok(fingerprint)
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.fetch_inner(url))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
