//! User-facing notifications
//!
//! Every operation outcome, good or bad, ends up as one `Notice`. The CLI
//! prints it, the dashboard shows it in the status bar.

use std::fmt;

use crate::desk::{StatusChange, Submission};
use crate::error::{ApiError, ClientError};
use shared::BookingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// The operation a failure came from; picks the generic wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Lookup,
    Load,
    Login,
    Update,
    Health,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    /// Map a failure to the message the user sees
    pub fn from_error(action: Action, err: &ClientError) -> Self {
        match err {
            ClientError::Validation(e) => Notice::error(e.to_string()),
            ClientError::InvalidCredentials => Notice::error("Invalid credentials"),
            ClientError::NotLoggedIn => Notice::error("Please log in as admin first"),
            ClientError::UpdateInFlight(_) | ClientError::AlreadyFinal(_) | ClientError::InvalidTargetStatus(_) => {
                Notice::warning(err.to_string())
            }
            ClientError::MissingBookingId => Notice::error(err.to_string()),
            ClientError::Api(api) => match action {
                Action::Update => Notice::error(update_message(api)),
                Action::Load => Notice::warning("Unable to load existing bookings. Check server connection."),
                Action::Submit => match api {
                    ApiError::Backend { message: Some(m), .. } => Notice::error(m.clone()),
                    _ => Notice::error("Error saving booking to database. Please try again."),
                },
                Action::Lookup => Notice::error("Error checking booking status. Please try again."),
                Action::Health => Notice::error(format!("Cannot connect to backend server: {}", api)),
                Action::Login => Notice::error(api.to_string()),
            },
        }
    }

    pub fn submitted(submission: &Submission) -> Self {
        let sms = if submission.sms_sent { " SMS sent to your phone." } else { "" };
        Notice::success(format!(
            "Booking ID: {} created successfully!{}",
            submission.booking.id, sms
        ))
    }

    pub fn status_changed(change: &StatusChange) -> Self {
        let action = match change.status {
            BookingStatus::Confirmed => "confirmed",
            _ => "rejected",
        };
        let sms = if change.sms_sent { " Customer SMS sent." } else { "" };
        Notice::success(format!(
            "Booking {} {} successfully!{}",
            change.booking_id, action, sms
        ))
    }

    pub fn print(&self) {
        let (color, tag) = match self.level {
            NoticeLevel::Success => ("32", "✅"),
            NoticeLevel::Info => ("36", "ℹ️ "),
            NoticeLevel::Warning => ("33", "⚠️ "),
            NoticeLevel::Error => ("31", "❌"),
        };
        eprintln!("\x1b[{}m{} {}\x1b[0m", color, tag, self.message);
    }
}

/// Status updates distinguish where the failure happened
fn update_message(err: &ApiError) -> String {
    match err {
        ApiError::Unreachable(_) => {
            "Server Connection Error: Please ensure the backend server is running.".to_string()
        }
        ApiError::Network(_) => "Network Error: Cannot reach the backend server. Make sure the server is running.".to_string(),
        ApiError::Http { status: 404, .. } => {
            "API Endpoint Not Found: The booking update endpoint is not available. Check server configuration.".to_string()
        }
        ApiError::Http { status: 500, .. } => {
            "Database Error: The backend reported a database problem.".to_string()
        }
        other => format!("Update Error: {}", other),
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_validation_message_is_surfaced() {
        let notice = Notice::from_error(Action::Submit, &ValidationError::Seats.into());
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Please select between 1 and 6 seats");
    }

    #[test]
    fn test_submit_backend_error_verbatim_or_generic() {
        let err = ClientError::Api(ApiError::Backend {
            status: 500,
            message: Some("Database connection unavailable".to_string()),
        });
        assert_eq!(Notice::from_error(Action::Submit, &err).message, "Database connection unavailable");

        let err = ClientError::Api(ApiError::Http { status: 502, message: None });
        assert_eq!(
            Notice::from_error(Action::Submit, &err).message,
            "Error saving booking to database. Please try again."
        );
    }

    #[test]
    fn test_update_errors_are_classified() {
        let notice = |api| Notice::from_error(Action::Update, &ClientError::Api(api)).message;

        assert!(notice(ApiError::Unreachable("HTTP 503".to_string())).starts_with("Server Connection Error"));
        assert!(notice(ApiError::Http { status: 404, message: None }).starts_with("API Endpoint Not Found"));
        assert!(notice(ApiError::Http { status: 500, message: None }).starts_with("Database Error"));
        assert_eq!(
            notice(ApiError::Backend { status: 404, message: Some("Booking not found".to_string()) }),
            "Update Error: Booking not found"
        );
    }

    #[test]
    fn test_load_failure_is_a_warning() {
        let err = ClientError::Api(ApiError::Decode("eof".to_string()));
        let notice = Notice::from_error(Action::Load, &err);
        assert_eq!(notice.level, NoticeLevel::Warning);
    }

    #[test]
    fn test_auth_failure_is_generic() {
        let notice = Notice::from_error(Action::Login, &ClientError::InvalidCredentials);
        assert_eq!(notice.to_string(), "Invalid credentials");
    }
}
