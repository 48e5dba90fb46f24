//! TUI module for the admin dashboard
//!
//! Provides a terminal view of the booking table with:
//! - Confirm/reject actions on pending rows
//! - A status bar showing the latest notification

mod app;

pub use app::Dashboard;
