//! Core domain types for Herald.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
mod notification;
mod ttl;

pub use ids::NotificationId;
pub use notification::{Notification, NotificationKind, NotificationSnapshot};
pub use ttl::{InvalidTtl, Ttl};
