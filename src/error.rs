// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors surfaced by the request pipeline to call sites.

use crate::storage::StorageError;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No, invalid, or expired credential. Recoverable only by logging in again.
    SessionExpired,
    /// Transport failure unrelated to authentication.
    NetworkError,
    /// The backend answered but reported a domain failure.
    BusinessError,
    /// The backend answered with something that is not a business envelope.
    InvalidResponse,
    /// The call site could not encode its request.
    InvalidRequest,
    /// Durable token storage failed.
    Storage,
}

/// Error type returned by every call site.
///
/// None of these are retried by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Network error: {message}")]
    Network {
        /// HTTP status when the transport got that far.
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Business { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Network {
            status,
            message: message.into(),
        }
    }

    pub fn business(code: i64, message: impl Into<String>) -> Self {
        ClientError::Business {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::SessionExpired => ErrorKind::SessionExpired,
            ClientError::Network { .. } => ErrorKind::NetworkError,
            ClientError::Business { .. } => ErrorKind::BusinessError,
            ClientError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ClientError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ClientError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code, used in log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::SessionExpired => "session_expired",
            ClientError::Network { .. } => "network_error",
            ClientError::Business { .. } => "business_error",
            ClientError::InvalidResponse(_) => "invalid_response",
            ClientError::InvalidRequest(_) => "invalid_request",
            ClientError::Storage(_) => "storage_error",
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_fields() {
        let err = ClientError::business(0, "密码错误");
        assert_eq!(err.kind(), ErrorKind::BusinessError);
        assert_eq!(err.to_string(), "密码错误");

        let err = ClientError::network(Some(502), "HTTP 502 Bad Gateway");
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert_eq!(err.to_string(), "Network error: HTTP 502 Bad Gateway");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ClientError::SessionExpired.error_code(), "session_expired");
        assert_eq!(
            ClientError::network(None, "timeout").error_code(),
            "network_error"
        );
        assert_eq!(
            ClientError::InvalidResponse("x".into()).error_code(),
            "invalid_response"
        );
        assert!(ClientError::SessionExpired.is_session_expired());
    }
}
