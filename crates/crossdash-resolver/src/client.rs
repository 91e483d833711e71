//! HTTP client for the resolver's `find-address` endpoint.
//!
//! Issues exactly one request per call. There is no retry: a failed
//! resolution ends the session, so the error is returned to the caller as-is.

use std::time::Duration;

use async_trait::async_trait;
use crossdash_core::{AppConfig, Coordinate};
use reqwest::{Client, Url};

use crate::error::ResolutionError;
use crate::types::{FindAddressResponse, ResolutionResult};

const FIND_ADDRESS_PATH: &str = "find-address";

/// Anything that can turn a coordinate into a [`ResolutionResult`].
///
/// The session depends on this trait rather than on [`ResolverClient`] so
/// tests can substitute a scripted resolver.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, at: Coordinate) -> Result<ResolutionResult, ResolutionError>;
}

/// Client for the resolver service.
///
/// Use [`ResolverClient::from_config`] in binaries or [`ResolverClient::new`]
/// to point at a mock server in tests.
pub struct ResolverClient {
    client: Client,
    endpoint: Url,
}

impl ResolverClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NetworkFailure`] if the underlying
    /// `reqwest::Client` cannot be constructed, or
    /// [`ResolutionError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so `join` appends to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| ResolutionError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(FIND_ADDRESS_PATH))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Creates a client from the resolver section of [`AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`ResolverClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ResolutionError> {
        Self::new(
            &config.resolver_url,
            config.resolver_timeout_secs,
            &config.user_agent,
        )
    }

    /// Resolves `at` into an address, facility list, and ETA sequence.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NetworkFailure`] on connection failure or timeout.
    /// - [`ResolutionError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ResolutionError::MalformedResponse`] if the body does not match the
    ///   contract or a facility coordinate cannot be parsed.
    pub async fn find_address(&self, at: Coordinate) -> Result<ResolutionResult, ResolutionError> {
        let url = self.build_url(at);
        tracing::debug!(%url, "requesting address resolution");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<FindAddressResponse>(&body).map_err(|e| {
            ResolutionError::MalformedResponse {
                context: format!("find-address at {at}"),
                reason: e.to_string(),
            }
        })?;
        let result = parsed.into_result()?;

        tracing::info!(
            address = %result.address,
            facilities = result.facilities.len(),
            eta_points = result.eta_minutes.len(),
            "location resolved"
        );
        Ok(result)
    }

    /// Builds `{base}/find-address?latitude=..&longitude=..`.
    fn build_url(&self, at: Coordinate) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &at.latitude.to_string())
            .append_pair("longitude", &at.longitude.to_string());
        url
    }
}

#[async_trait]
impl AddressResolver for ResolverClient {
    async fn resolve(&self, at: Coordinate) -> Result<ResolutionResult, ResolutionError> {
        self.find_address(at).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
