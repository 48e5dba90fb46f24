//! Error types for the booking client

use shared::{BookingId, BookingStatus, TransitionError};
use thiserror::Error;

use crate::validation::ValidationError;

/// Failures talking to the booking backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, DNS...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response whose body was not a usable envelope
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    /// `success: false`, with the backend's reason when it gave one
    #[error("{}", .message.as_deref().unwrap_or("Unknown server error"))]
    Backend { status: u16, message: Option<String> },

    /// 2xx response that did not parse as the expected JSON
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Preflight health check failed before a mutation was attempted
    #[error("Cannot connect to backend server: {0}")]
    Unreachable(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::Backend { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Transport-level failure: nothing reached (or came back from) the backend
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Unreachable(_))
    }
}

/// Every way a booking-client operation can fail
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin login required")]
    NotLoggedIn,

    #[error("An update for booking {0} is already in progress")]
    UpdateInFlight(BookingId),

    #[error("Booking {} is already {}", .0.id, .0.from)]
    AlreadyFinal(TransitionError),

    #[error("Cannot set a booking to {0}; use confirmed or rejected")]
    InvalidTargetStatus(BookingStatus),

    #[error("Backend accepted the booking but returned no booking id")]
    MissingBookingId,
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_is_verbatim() {
        let err = ApiError::Backend {
            status: 400,
            message: Some("Seats must be between 1 and 6".to_string()),
        };
        assert_eq!(err.to_string(), "Seats must be between 1 and 6");

        let err = ApiError::Backend { status: 200, message: None };
        assert_eq!(err.to_string(), "Unknown server error");
    }

    #[test]
    fn test_http_error_display() {
        let err = ApiError::Http { status: 502, message: None };
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_network());

        let err = ApiError::Http {
            status: 500,
            message: Some("boom".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_already_final_message() {
        let err = ClientError::AlreadyFinal(TransitionError {
            id: 4,
            from: BookingStatus::Confirmed,
            to: BookingStatus::Rejected,
        });
        assert_eq!(err.to_string(), "Booking 4 is already confirmed");
    }
}
