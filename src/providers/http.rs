//! Provider HTTP Helper — shared outbound fetch with deadline, auth, typed error
//!
//! Every concrete provider routes its outbound calls through this wrapper
//! so per-call deadlines and error shapes are uniform (spec.md §4.7),
//! mirroring the teacher's `HeliusClient` pattern of one `reqwest::Client`
//! plus a fixed timeout per call.

use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A thin `reqwest`-backed client with a per-call deadline and optional
/// bearer auth (spec.md §4.7).
#[derive(Clone)]
pub struct ProviderHttp {
    client: Client,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl ProviderHttp {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build provider HTTP client");
        Self {
            client,
            timeout,
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url).timeout(self.timeout);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// GET `url`, decode the JSON body as `T`. Non-2xx responses are
    /// surfaced as `Error::HttpStatus` with the body attached.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "provider http get_json");
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Deserialization(format!("{url}: {e}")))
    }

    /// GET `url`, return the raw text body — used for raw-file verification
    /// where the response is not JSON (spec.md §4.7).
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "provider http get_text");
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("{url}: {e}")))
    }

    /// Whether a response status indicates the resource was not found —
    /// providers treat this as absence, not an error (spec.md §7
    /// "Subject-not-found").
    pub fn is_not_found(status: StatusCode) -> bool {
        status == StatusCode::NOT_FOUND
    }
}

fn map_transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Provider {
            name: url.to_string(),
            reason: "request timed out".to_string(),
        }
    } else {
        Error::Transport(format!("{url}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        assert!(ProviderHttp::is_not_found(StatusCode::NOT_FOUND));
        assert!(!ProviderHttp::is_not_found(StatusCode::OK));
    }

    #[test]
    fn default_timeout_matches_spec() {
        assert_eq!(DEFAULT_TIMEOUT_SECS, 10);
    }
}
