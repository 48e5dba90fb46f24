//! Types shared between the taxi booking client and its REST backend.

pub mod booking;
pub mod messages;

pub use booking::*;
pub use messages::*;
