//! Local mirror of the backend's booking list

use chrono::{DateTime, Utc};
use shared::{Booking, BookingId, BookingStatus, TransitionError};

/// Bookings in the order the backend (or the client) produced them.
///
/// Only ever patched after the backend confirmed a change.
#[derive(Debug, Clone, Default)]
pub struct BookingCache {
    bookings: Vec<Booking>,
}

impl BookingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a fresh backend listing
    pub fn replace_all(&mut self, bookings: Vec<Booking>) {
        self.bookings = bookings;
    }

    /// Add a newly created booking. An entry with the same id is replaced.
    pub fn append(&mut self, booking: Booking) {
        match self.bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => self.bookings.push(booking),
        }
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Record a backend-confirmed status change.
    ///
    /// `Ok(false)` when the booking is not cached; an error when the cached
    /// copy is already terminal (it is left as is).
    pub fn apply_status(
        &mut self,
        id: BookingId,
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, TransitionError> {
        match self.bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) => booking.transition(status, at).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn as_slice(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.bookings.iter().filter(|b| b.is_pending()).count()
    }
}
