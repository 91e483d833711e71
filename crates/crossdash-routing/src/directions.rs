//! HTTP client for a Directions-style routing API.
//!
//! Sends `GET {base}directions/json?origin=..&destination=..&mode=..&key=..`
//! and maps the provider's `status` envelope onto [`RoutingError`]. Only the
//! first returned route is used; the steps of all its legs form the path.

use std::time::Duration;

use async_trait::async_trait;
use crossdash_core::{AppConfig, Coordinate};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::RoutingError;
use crate::route::RoutingCapability;
use crate::types::{RoutePath, RouteRequest, RouteSegment};

const DIRECTIONS_PATH: &str = "directions/json";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    start_location: WireLatLng,
    end_location: WireLatLng,
    #[serde(default)]
    distance: Option<WireValue>,
    #[serde(default)]
    duration: Option<WireValue>,
    #[serde(default)]
    html_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct WireValue {
    value: u64,
}

/// Routing capability backed by a Directions HTTP API.
pub struct DirectionsClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl DirectionsClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`RoutingError::InvalidBaseUrl`] if `base_url` is not
    /// a valid URL.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(DIRECTIONS_PATH))
            .map_err(|e| RoutingError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.map(str::to_owned),
        })
    }

    /// Creates a client from the routing section of [`AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`DirectionsClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, RoutingError> {
        Self::new(
            &config.routing_url,
            config.routing_api_key.as_deref(),
            config.routing_timeout_secs,
            &config.user_agent,
        )
    }

    fn build_url(&self, request: &RouteRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("origin", &request.origin.to_query_value());
            pairs.append_pair("destination", &request.destination.to_query_value());
            pairs.append_pair("mode", &request.mode.to_string());
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    /// Fetches a path for `request`.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::NoRouteFound`] for `ZERO_RESULTS`, `NOT_FOUND`, or an
    ///   `OK` response without routes.
    /// - [`RoutingError::ProviderError`] for any other non-`OK` status.
    /// - [`RoutingError::Http`] / [`RoutingError::UnexpectedStatus`] on transport failure.
    /// - [`RoutingError::Deserialize`] / [`RoutingError::InvalidPath`] on a bad body.
    pub async fn fetch_path(&self, request: &RouteRequest) -> Result<RoutePath, RoutingError> {
        let url = self.build_url(request);
        // The key is a secret; log the request without the query string.
        tracing::debug!(
            endpoint = %self.endpoint,
            origin = %request.origin,
            destination = %request.destination,
            mode = %request.mode,
            "requesting directions"
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
                context: format!("directions {} -> {}", request.origin, request.destination),
                source: e,
            })?;

        into_path(parsed)
    }
}

#[async_trait]
impl RoutingCapability for DirectionsClient {
    async fn directions(&self, request: &RouteRequest) -> Result<RoutePath, RoutingError> {
        self.fetch_path(request).await
    }
}

fn into_path(response: DirectionsResponse) -> Result<RoutePath, RoutingError> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => {
            return Err(RoutingError::NoRouteFound {
                status: response.status,
            })
        }
        _ => {
            return Err(RoutingError::ProviderError {
                status: response.status,
                message: response.error_message,
            })
        }
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Err(RoutingError::NoRouteFound {
            status: "OK".to_owned(),
        });
    };

    let segments = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(into_segment)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RoutePath {
        summary: route.summary.filter(|s| !s.trim().is_empty()),
        segments,
    })
}

fn into_segment(step: WireStep) -> Result<RouteSegment, RoutingError> {
    let point = |p: &WireLatLng| {
        Coordinate::new(p.lat, p.lng).map_err(|e| RoutingError::InvalidPath(e.to_string()))
    };

    Ok(RouteSegment {
        start: point(&step.start_location)?,
        end: point(&step.end_location)?,
        distance_meters: step.distance.map_or(0, |d| d.value),
        duration_secs: step.duration.map_or(0, |d| d.value),
        instruction: step.html_instructions,
    })
}
