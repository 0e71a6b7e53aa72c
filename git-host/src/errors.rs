//! Error type for the code-host client.
//!
//! Status-aware mapping so callers can tell terminal failures (`NotFound`)
//! from transient ones (`RateLimited`, `Network`, `Server`). Retry policy
//! itself belongs to the caller.

use thiserror::Error;

/// Convenient alias for host-facing results.
pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// The item or repository does not exist (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without a status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of a host response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Map an HTTP status code onto the host error taxonomy.
pub(crate) fn map_status(code: u16) -> HostError {
    match code {
        401 => HostError::Unauthorized,
        403 => HostError::Forbidden,
        404 => HostError::NotFound,
        429 => HostError::RateLimited {
            retry_after_secs: None,
        },
        500..=599 => HostError::Server(code),
        _ => HostError::HttpStatus(code),
    }
}

impl From<reqwest::Error> for HostError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return HostError::Timeout;
        }
        if let Some(status) = e.status() {
            return map_status(status.as_u16());
        }
        if e.is_decode() {
            return HostError::InvalidResponse(e.to_string());
        }
        HostError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(map_status(401), HostError::Unauthorized));
        assert!(matches!(map_status(404), HostError::NotFound));
        assert!(matches!(map_status(429), HostError::RateLimited { .. }));
        assert!(matches!(map_status(503), HostError::Server(503)));
        assert!(matches!(map_status(418), HostError::HttpStatus(418)));
    }
}
