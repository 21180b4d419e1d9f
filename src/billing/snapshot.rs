use chrono::{DateTime, Utc};

/// Point-in-time copy of a session as last fetched from the backend.
///
/// `user_balance` is the balance at fetch time, not a live value: between
/// fetches the remaining balance is re-derived from the elapsed time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub hourly_rate: Option<f64>,
    pub user_balance: Option<f64>,
    pub is_active: bool,
    /// Recorded length in hours, only meaningful once the session ended
    pub duration_hours: Option<f64>,
}

impl SessionSnapshot {
    /// Snapshot of a running session
    #[cfg(test)]
    pub fn active(start_time: DateTime<Utc>, hourly_rate: f64, user_balance: f64) -> Self {
        Self {
            start_time: Some(start_time),
            hourly_rate: Some(hourly_rate),
            user_balance: Some(user_balance),
            is_active: true,
            duration_hours: None,
        }
    }

    /// Rate usable for division, if any
    pub(crate) fn billable_rate(&self) -> Option<f64> {
        self.hourly_rate.filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    /// Balance usable for arithmetic, if any
    pub(crate) fn known_balance(&self) -> Option<f64> {
        self.user_balance.filter(|balance| balance.is_finite())
    }

    /// Display string for an ended session's recorded duration
    pub fn duration_display(&self) -> String {
        match self.duration_hours {
            Some(hours) if hours.is_finite() => format!("{hours:.2} hours"),
            _ => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_billable_rate_rejects_non_positive_and_nan() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut snapshot = SessionSnapshot::active(start, 5.0, 10.0);
        assert_eq!(snapshot.billable_rate(), Some(5.0));

        snapshot.hourly_rate = Some(0.0);
        assert_eq!(snapshot.billable_rate(), None);

        snapshot.hourly_rate = Some(-3.0);
        assert_eq!(snapshot.billable_rate(), None);

        snapshot.hourly_rate = Some(f64::NAN);
        assert_eq!(snapshot.billable_rate(), None);

        snapshot.hourly_rate = None;
        assert_eq!(snapshot.billable_rate(), None);
    }

    #[test]
    fn test_duration_display() {
        let mut snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.duration_display(), "N/A");

        snapshot.duration_hours = Some(1.5);
        assert_eq!(snapshot.duration_display(), "1.50 hours");

        snapshot.duration_hours = Some(0.333);
        assert_eq!(snapshot.duration_display(), "0.33 hours");
    }
}
