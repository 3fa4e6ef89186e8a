//! # Rollbook Core
//!
//! Domain logic for rollbook:
//! - Recurrence descriptors and the subscription calendar feed
//! - Attendance inference and reconciliation
//! - Enrollment lifecycle and session scheduling
//!
//! Everything here operates on validated inputs and an already-initialized
//! pool from `rollbook-common`; the HTTP/auth layer that drives it lives
//! elsewhere.

pub mod attendance;
pub mod calendar;
pub mod enrollment;
pub mod session;
