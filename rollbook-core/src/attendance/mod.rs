//! Attendance inference and reconciliation

pub mod infer;
pub mod reconcile;

pub use infer::{day_statuses, inferred_presence, DayStatus};
pub use reconcile::{AttendanceRepository, DatedEntry, DayEntry};
