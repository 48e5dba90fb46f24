use serde::{Deserialize, Serialize};

use crate::booking::{Booking, BookingId, BookingStatus};

// ============================================================================
// Envelope
// ============================================================================

/// Every backend response carries a `success` flag and, on failure, an
/// optional `error` string. The flag is authoritative; HTTP status is advisory.
pub trait Envelope {
    fn success(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

macro_rules! envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Envelope for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn error(&self) -> Option<&str> {
                    self.error.as_deref().filter(|e| !e.trim().is_empty())
                }
            }
        )*
    };
}

envelope!(
    BookingListResponse,
    CreateBookingResponse,
    StatusLookupResponse,
    UpdateStatusResponse,
);

// ============================================================================
// Health
// ============================================================================

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Anything else the backend reports (database, sms, timestamp...)
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Bookings
// ============================================================================

/// `GET /bookings`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub success: bool,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /bookings` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub phone: String,
    pub pickup: String,
    pub drop: String,
    pub datetime: String,
    pub seats: u32,
}

/// `POST /bookings` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sms_sent: bool,
    /// Full stored document, when the backend echoes it
    #[serde(default)]
    pub booking: Option<Booking>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Lookup key; sent as query string (`GET`) or JSON body (`POST`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLookupRequest {
    pub booking_id: BookingId,
    pub phone: String,
}

/// Status lookup response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusLookupResponse {
    pub success: bool,
    #[serde(default)]
    pub booking: Option<Booking>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /bookings/{id}/update` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// `POST /bookings/{id}/update` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sms_sent: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
