use std::fmt;

use thiserror::Error;

/// Failures of a single GitLab API call. None of them are retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build request: {message}")]
    RequestBuild { message: String },

    #[error("Transport failure ({cause}): {message}")]
    Transport {
        cause: TransportCause,
        message: String,
    },

    #[error("Failed to decode response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCause {
    Connect,
    Timeout,
    Cancelled,
    Other,
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportCause::Connect => "connect",
            TransportCause::Timeout => "timeout",
            TransportCause::Cancelled => "cancelled",
            TransportCause::Other => "other",
        };
        f.write_str(name)
    }
}

impl ApiError {
    pub fn transport_cause(&self) -> Option<TransportCause> {
        match self {
            ApiError::Transport { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return ApiError::RequestBuild {
                message: err.to_string(),
            };
        }

        let cause = if err.is_timeout() {
            TransportCause::Timeout
        } else if err.is_connect() {
            TransportCause::Connect
        } else {
            TransportCause::Other
        };

        ApiError::Transport {
            cause,
            message: err.to_string(),
        }
    }
}

/// Errors raised outside the API core: configuration and local I/O.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display_names_cause() {
        let err = ApiError::Transport {
            cause: TransportCause::Timeout,
            message: "operation timed out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transport failure (timeout): operation timed out"
        );
        assert_eq!(err.transport_cause(), Some(TransportCause::Timeout));
    }

    #[test]
    fn test_decode_error_has_no_transport_cause() {
        let err = ApiError::Decode {
            status: 500,
            message: "EOF while parsing a value".to_string(),
        };
        assert_eq!(err.transport_cause(), None);
        assert!(err.to_string().contains("HTTP 500"));
    }
}
