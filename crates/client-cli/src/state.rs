use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use shared::{Booking, BookingId};

use crate::auth::AdminSession;
use crate::cache::BookingCache;

/// Screens of the booking client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    Booking,
    Status,
    Availability,
    Admin,
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Page::Home),
            "booking" | "book" => Ok(Page::Booking),
            "status" => Ok(Page::Status),
            "availability" => Ok(Page::Availability),
            "admin" => Ok(Page::Admin),
            other => Err(format!("Unknown page: {}", other)),
        }
    }
}

/// What the admin page shows for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Login,
    Dashboard,
}

/// Public seat availability, toggled by an admin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeatAvailability {
    #[default]
    Available,
    FullyBooked,
}

impl SeatAvailability {
    pub fn toggled(self) -> Self {
        match self {
            SeatAvailability::Available => SeatAvailability::FullyBooked,
            SeatAvailability::FullyBooked => SeatAvailability::Available,
        }
    }
}

impl fmt::Display for SeatAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatAvailability::Available => f.write_str("Available"),
            SeatAvailability::FullyBooked => f.write_str("Fully Booked"),
        }
    }
}

/// Result of a status lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Booking),
    NotFound { booking_id: BookingId },
}

/// Everything the client keeps in memory, in one place.
///
/// Mutated only through `BookingDesk`, which holds it behind a mutex and
/// never keeps the lock across a backend call.
#[derive(Debug, Default)]
pub struct AppState {
    pub page: Page,
    pub session: AdminSession,
    pub cache: BookingCache,
    /// Booking ids with an update request still outstanding
    pub in_flight: HashSet<BookingId>,
    pub availability: SeatAvailability,
    /// Id to pre-fill on the status page after a successful booking
    pub status_prefill: Option<BookingId>,
    pub last_lookup: Option<LookupOutcome>,
}

impl AppState {
    /// Switch page, applying the per-page entry effects
    pub fn navigate(&mut self, page: Page) -> Option<AdminView> {
        self.page = page;
        match page {
            Page::Status => {
                self.last_lookup = None;
                None
            }
            Page::Admin => Some(if self.session.is_active() {
                AdminView::Dashboard
            } else {
                AdminView::Login
            }),
            _ => None,
        }
    }
}
