//! Client error taxonomy.
//!
//! Retryability is decided once, at the point the HTTP failure is first
//! observed, and carried on the error instead of being re-derived
//! downstream.

use thiserror::Error;

/// Whether re-attempting the same operation is expected to plausibly
/// succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryability {
    Retryable,
    NonRetryable,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("backend returned status {status}: {detail}")]
    Status {
        status: u16,
        detail: String,
        retryability: Retryability,
    },
    #[error("request to backend failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
        retryability: Retryability,
    },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Classify a non-2xx response. 4xx is the caller's fault and will not
    /// improve on retry; everything else is worth re-attempting.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let retryability = if (400..500).contains(&status) {
            Retryability::NonRetryable
        } else {
            Retryability::Retryable
        };
        ClientError::Status {
            status,
            detail: detail.into(),
            retryability,
        }
    }

    /// Classify a transport-level failure. Timeouts, connect failures, and
    /// interrupted response bodies are retryable; request construction and
    /// payload decoding problems are not.
    pub fn from_transport(source: reqwest::Error) -> Self {
        let retryability = if source.is_builder() || source.is_decode() {
            Retryability::NonRetryable
        } else {
            Retryability::Retryable
        };
        ClientError::Transport {
            source,
            retryability,
        }
    }

    pub fn retryability(&self) -> Retryability {
        match self {
            ClientError::Status { retryability, .. }
            | ClientError::Transport { retryability, .. } => *retryability,
            // A malformed payload after a 2xx will not improve on retry.
            ClientError::Decode(_) | ClientError::Url(_) => Retryability::NonRetryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retryability() == Retryability::Retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_not_retryable() {
        let err = ClientError::from_status(404, "not found");
        assert!(!err.is_retryable());
        let err = ClientError::from_status(422, "unprocessable");
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = ClientError::from_status(500, "internal");
        assert!(err.is_retryable());
        let err = ClientError::from_status(503, "unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_failures_are_not_retryable() {
        let err = ClientError::Decode("unexpected shape".to_string());
        assert!(!err.is_retryable());
    }
}
