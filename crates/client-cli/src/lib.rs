//! Taxi booking client
//!
//! Books rides, looks up their status and lets an admin confirm or reject
//! pending bookings against the booking REST backend.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod desk;
pub mod error;
pub mod notify;
pub mod render;
pub mod state;
pub mod tui;
pub mod validation;

pub use desk::BookingDesk;
pub use error::{ApiError, ClientError};
