//! Session billing
//!
//! Every screen that shows a running session (dashboard, session table,
//! profile panel) derives its remaining time and accrued cost from the same
//! pure functions in this module. Callers always pass the instant they want
//! the figures computed for; nothing here reads the clock.

pub mod calculator;
pub mod snapshot;

pub use calculator::{
    affordable_hours, compute_estimated_cost, compute_time_remaining, format_cost, TimeRemaining,
    Urgency,
};
pub use snapshot::SessionSnapshot;
