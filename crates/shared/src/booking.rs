use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Backend-assigned booking identifier
pub type BookingId = u64;

/// Smallest and largest number of seats a single booking may hold
pub const MIN_SEATS: u32 = 1;
pub const MAX_SEATS: u32 = 6;

// ============================================================================
// Booking
// ============================================================================

/// A single ride request as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub name: String,
    pub phone: String,
    pub pickup: String,
    pub drop: String,
    /// Requested pickup time exactly as submitted (ISO-8601, usually without offset)
    pub datetime: String,
    pub seats: u32,
    pub status: BookingStatus,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Move the booking to `next`, stamping `updated_at` with `at`.
    ///
    /// Only pending bookings move, and only to a terminal status. The
    /// booking is left untouched when the transition is refused.
    pub fn transition(&mut self, next: BookingStatus, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(&next) {
            return Err(TransitionError {
                id: self.id,
                from: self.status.clone(),
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Some(at);
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Newest first; bookings without a creation time go last, ties broken by id.
    pub fn newest_first(a: &Booking, b: &Booking) -> Ordering {
        match (&a.created_at, &b.created_at) {
            (Some(x), Some(y)) => y.cmp(x).then_with(|| b.id.cmp(&a.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a booking.
///
/// Values the client does not recognise are kept verbatim in `Unknown` so a
/// newer backend never breaks listing; they are never treated as pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Unknown(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: &BookingStatus) -> bool {
        matches!(self, BookingStatus::Pending) && next.is_terminal()
    }
}

impl From<String> for BookingStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "rejected" => BookingStatus::Rejected,
            _ => BookingStatus::Unknown(raw),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status change the lifecycle does not allow
#[derive(Debug, Clone, PartialEq, Error)]
#[error("booking {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub id: BookingId,
    pub from: BookingStatus,
    pub to: BookingStatus,
}

// ============================================================================
// Tests
// ============================================================================
