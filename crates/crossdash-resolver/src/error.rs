use thiserror::Error;

/// Errors returned by the resolver client.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("resolver request failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// The resolver answered with a non-2xx status.
    #[error("resolver returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The body did not match the `find-address` contract, or a facility
    /// coordinate could not be parsed.
    #[error("malformed resolver response for {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid resolver URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Coarse classification of a [`ResolutionError`], cheap to clone into
/// session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    NetworkFailure,
    MalformedResponse,
}

impl ResolutionError {
    #[must_use]
    pub fn kind(&self) -> ResolutionErrorKind {
        match self {
            ResolutionError::MalformedResponse { .. } => ResolutionErrorKind::MalformedResponse,
            ResolutionError::NetworkFailure(_)
            | ResolutionError::UnexpectedStatus { .. }
            | ResolutionError::InvalidBaseUrl { .. } => ResolutionErrorKind::NetworkFailure,
        }
    }
}

impl ResolutionErrorKind {
    /// Message shown to the user when resolution ends the session.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            ResolutionErrorKind::NetworkFailure => "Failed to fetch address",
            ResolutionErrorKind::MalformedResponse => "Failed to read the address response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_is_a_network_failure() {
        let err = ResolutionError::UnexpectedStatus {
            status: 502,
            url: "http://127.0.0.1:5000/find-address".to_owned(),
        };
        assert_eq!(err.kind(), ResolutionErrorKind::NetworkFailure);
        assert_eq!(err.kind().user_message(), "Failed to fetch address");
    }

    #[test]
    fn malformed_response_has_its_own_message() {
        let err = ResolutionError::MalformedResponse {
            context: "hospitals[0].lat".to_owned(),
            reason: "not a number".to_owned(),
        };
        assert_eq!(err.kind(), ResolutionErrorKind::MalformedResponse);
        assert_eq!(
            err.kind().user_message(),
            "Failed to read the address response"
        );
    }
}
