//! Host location capabilities.
//!
//! Every provider makes exactly one attempt per [`LocationProvider::acquire`]
//! call and classifies failures into [`LocationError`]. Nothing here retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossdash_core::{AppConfig, Coordinate};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

/// Why a location could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("location lookup failed: {0}")]
    Unknown(String),

    /// The host has no location capability at all.
    #[error("location capability not supported on this host")]
    Unsupported,
}

impl LocationError {
    /// Message shown to the user when acquisition ends the session.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "User denied the request for Geolocation.",
            LocationError::PositionUnavailable => "Location information is unavailable.",
            LocationError::Timeout => "The request to get user location timed out.",
            LocationError::Unknown(_) => "An unknown error occurred.",
            LocationError::Unsupported => "Geolocation is not supported on this host.",
        }
    }
}

/// A single-shot source of the user's position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn acquire(&self) -> Result<Coordinate, LocationError>;
}

/// An operator-supplied position. Always succeeds.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn acquire(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Stand-in used when no capability is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocation;

#[async_trait]
impl LocationProvider for UnsupportedLocation {
    async fn acquire(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Body of a network geolocation lookup.
///
/// Accepts both `lat`/`lon` and `latitude`/`longitude` spellings, and the
/// `status`/`message` envelope some services wrap around the fix.
#[derive(Debug, Deserialize)]
struct GeoFix {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "lng", alias = "longitude")]
    lon: Option<f64>,
}

/// Network geolocation over HTTP (IP-based lookup services).
pub struct HttpLocationProvider {
    client: Client,
    url: Url,
}

impl HttpLocationProvider {
    /// # Errors
    ///
    /// Returns [`LocationError::Unknown`] if `url` does not parse or the HTTP
    /// client cannot be built.
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, LocationError> {
        let url = Url::parse(url)
            .map_err(|e| LocationError::Unknown(format!("invalid location URL \"{url}\": {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LocationError::Unknown(e.to_string()))?;
        Ok(Self { client, url })
    }

    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::Unknown(format!(
                "HTTP {} from location service",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(classify_transport)?;
        let fix: GeoFix = serde_json::from_str(&body)
            .map_err(|e| LocationError::Unknown(format!("undecodable location body: {e}")))?;

        if fix.status.as_deref() == Some("fail") {
            tracing::warn!(
                message = fix.message.as_deref().unwrap_or(""),
                "location service could not place this host"
            );
            return Err(LocationError::PositionUnavailable);
        }

        let (Some(lat), Some(lon)) = (fix.lat, fix.lon) else {
            return Err(LocationError::PositionUnavailable);
        };
        Coordinate::new(lat, lon).map_err(|e| {
            tracing::warn!(error = %e, "location service returned an unusable fix");
            LocationError::PositionUnavailable
        })
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn acquire(&self) -> Result<Coordinate, LocationError> {
        self.locate().await
    }
}

fn classify_transport(err: reqwest::Error) -> LocationError {
    if err.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Unknown(err.to_string())
    }
}

/// Picks the capability for this host: a fixed position wins, then a
/// network lookup, otherwise [`UnsupportedLocation`].
///
/// # Errors
///
/// Returns [`LocationError::Unknown`] if the network provider cannot be built.
pub fn provider_from_config(config: &AppConfig) -> Result<Arc<dyn LocationProvider>, LocationError> {
    if let Some(at) = config.fixed_location {
        return Ok(Arc::new(FixedLocation(at)));
    }
    if let Some(url) = &config.location_url {
        let provider = HttpLocationProvider::new(
            url,
            Duration::from_secs(config.location_timeout_secs),
            &config.user_agent,
        )?;
        return Ok(Arc::new(provider));
    }
    tracing::warn!("no location capability configured");
    Ok(Arc::new(UnsupportedLocation))
}
