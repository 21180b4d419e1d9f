//! Active session table
//!
//! Rows carry the live countdown and the quarter-hour cost estimate for every
//! running session, recomputed against the instant passed in.

pub mod data;

pub use data::{session_rows, urgency_counts, SessionRow};
