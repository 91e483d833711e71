use thiserror::Error;

/// Errors returned while computing a route.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The provider answered but has no drivable path between the points.
    #[error("no route found (provider status {status})")]
    NoRouteFound { status: String },

    /// The provider rejected the request (quota, key, invalid request, ...).
    #[error("routing provider returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    ProviderError {
        status: String,
        message: Option<String>,
    },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing provider returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned a path containing an unusable point.
    #[error("invalid route geometry: {0}")]
    InvalidPath(String),

    #[error("invalid routing URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Coarse classification used by the session when logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingErrorKind {
    NoRouteFound,
    ProviderError,
}

impl RoutingError {
    #[must_use]
    pub fn kind(&self) -> RoutingErrorKind {
        match self {
            RoutingError::NoRouteFound { .. } => RoutingErrorKind::NoRouteFound,
            RoutingError::ProviderError { .. }
            | RoutingError::Http(_)
            | RoutingError::UnexpectedStatus { .. }
            | RoutingError::Deserialize { .. }
            | RoutingError::InvalidPath(_)
            | RoutingError::InvalidBaseUrl { .. } => RoutingErrorKind::ProviderError,
        }
    }
}
