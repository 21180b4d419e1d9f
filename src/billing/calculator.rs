use chrono::{DateTime, Utc};
use std::fmt;

use super::snapshot::SessionSnapshot;

/// Session length the progress bars are normalised against (8 hours)
pub const MAX_SESSION_MINUTES: u64 = 480;
/// At or below this many minutes left a session is critical
pub const CRITICAL_MINUTES: u64 = 15;
/// At or below this many minutes left a session is a warning
pub const WARNING_MINUTES: u64 = 30;
/// Estimated cost is billed in quarter hours
pub const BILLING_INCREMENTS_PER_HOUR: f64 = 4.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Urgency classification used to colour remaining time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
    /// Only produced for snapshots that cannot be billed (no start time,
    /// no balance, or a non-positive rate). A session that simply ran out
    /// of money is `Critical`.
    Expired,
}

impl Urgency {
    /// Classify a whole number of remaining minutes
    pub fn from_total_minutes(total_minutes: u64) -> Self {
        if total_minutes <= CRITICAL_MINUTES {
            Urgency::Critical
        } else if total_minutes <= WARNING_MINUTES {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Warning => "warning",
            Urgency::Critical => "critical",
            Urgency::Expired => "expired",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived view of how much play time a session has left.
///
/// Recomputed on every tick and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRemaining {
    pub elapsed_hours: f64,
    pub cost_so_far: f64,
    pub remaining_balance: f64,
    pub remaining_hours: f64,
    pub hours: u64,
    pub minutes: u64,
    pub total_minutes: u64,
    /// Zero padded `HH:MM`
    pub formatted: String,
    /// Share of an 8 hour session, capped at 100
    pub percentage: f64,
    pub status: Urgency,
}

impl TimeRemaining {
    /// Result for a snapshot that cannot be billed
    pub fn expired() -> Self {
        Self {
            elapsed_hours: 0.0,
            cost_so_far: 0.0,
            remaining_balance: 0.0,
            remaining_hours: 0.0,
            hours: 0,
            minutes: 0,
            total_minutes: 0,
            formatted: "00:00".to_string(),
            percentage: 0.0,
            status: Urgency::Expired,
        }
    }

    /// Compact `"1h 5m"` rendering used in tables
    pub fn short_display(&self) -> String {
        format!("{}h {}m", self.hours, self.minutes)
    }
}

/// Hours between `start` and `now`; a start time in the future counts as zero
pub fn elapsed_hours(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(start).num_milliseconds();
    (millis as f64 / MILLIS_PER_HOUR).max(0.0)
}

/// Remaining affordable play time for `session` as of `now`.
///
/// Minutes are truncated, never rounded up: 1.99 hours left shows as 1h 59m.
pub fn compute_time_remaining(session: &SessionSnapshot, now: DateTime<Utc>) -> TimeRemaining {
    let (Some(start), Some(rate), Some(balance)) = (
        session.start_time,
        session.billable_rate(),
        session.known_balance(),
    ) else {
        return TimeRemaining::expired();
    };

    let elapsed = elapsed_hours(start, now);
    let cost_so_far = elapsed * rate;
    let remaining_balance = (balance - cost_so_far).max(0.0);
    let remaining_hours = remaining_balance / rate;

    let whole_hours = remaining_hours.floor();
    let hours = whole_hours as u64;
    let minutes = (((remaining_hours - whole_hours) * 60.0).floor() as u64).min(59);
    let total_minutes = hours.saturating_mul(60).saturating_add(minutes);

    let percentage =
        (total_minutes as f64 / MAX_SESSION_MINUTES as f64 * 100.0).min(100.0);

    TimeRemaining {
        elapsed_hours: elapsed,
        cost_so_far,
        remaining_balance,
        remaining_hours,
        hours,
        minutes,
        total_minutes,
        formatted: format!("{hours:02}:{minutes:02}"),
        percentage,
        status: Urgency::from_total_minutes(total_minutes),
    }
}

/// Accrued cost of a session, billed up to the next started quarter hour
pub fn compute_estimated_cost(start_time: DateTime<Utc>, hourly_rate: f64, now: DateTime<Utc>) -> f64 {
    if !hourly_rate.is_finite() {
        return 0.0;
    }

    let hours = elapsed_hours(start_time, now);
    let billed_hours = (hours * BILLING_INCREMENTS_PER_HOUR).ceil() / BILLING_INCREMENTS_PER_HOUR;
    billed_hours * hourly_rate
}

/// Two decimal rendering for money amounts
pub fn format_cost(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Hours a balance buys at `hourly_rate`, truncated to two decimals
pub fn affordable_hours(balance: f64, hourly_rate: f64) -> f64 {
    if !(hourly_rate.is_finite() && hourly_rate > 0.0) || !balance.is_finite() {
        return 0.0;
    }

    ((balance / hourly_rate * 100.0).floor() / 100.0).max(0.0)
}
