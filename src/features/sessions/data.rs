use chrono::{DateTime, Utc};

use crate::billing::{compute_estimated_cost, compute_time_remaining, format_cost, TimeRemaining, Urgency};
use crate::cafe::{SessionRecord, UserProfile};
use crate::features::format_start;

/// One line of the active session table
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: i64,
    pub user: String,
    pub machine: String,
    pub machine_type: String,
    pub started: String,
    pub remaining: TimeRemaining,
    /// Cost so far billed in quarter hours; unknown without start or a billable rate
    pub estimated_cost: Option<f64>,
}

impl SessionRow {
    pub fn machine_display(&self) -> String {
        if self.machine_type.is_empty() {
            self.machine.clone()
        } else {
            format!("{} ({})", self.machine, self.machine_type)
        }
    }

    pub fn cost_display(&self) -> String {
        match self.estimated_cost {
            Some(cost) => format!("${}", format_cost(cost)),
            None => "-".to_string(),
        }
    }
}

/// Rows for every active session, in backend order
pub fn session_rows(
    sessions: &[SessionRecord],
    viewer: Option<&UserProfile>,
    now: DateTime<Utc>,
) -> Vec<SessionRow> {
    sessions
        .iter()
        .filter(|session| session.is_active)
        .map(|session| {
            let snapshot = session.snapshot_for(viewer);
            let estimated_cost = match (snapshot.start_time, snapshot.billable_rate()) {
                (Some(start), Some(rate)) => Some(compute_estimated_cost(start, rate, now)),
                _ => None,
            };

            SessionRow {
                id: session.id,
                user: session.username_display().to_string(),
                machine: session.machine_display().to_string(),
                machine_type: session.machine_type.clone().unwrap_or_default(),
                started: format_start(snapshot.start_time),
                remaining: compute_time_remaining(&snapshot, now),
                estimated_cost,
            }
        })
        .collect()
}

/// How many rows sit in each urgency band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrgencyCounts {
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
    pub expired: usize,
}

impl UrgencyCounts {
    /// Sessions that need staff attention soon
    pub fn attention(&self) -> usize {
        self.warning + self.critical + self.expired
    }
}

pub fn urgency_counts(rows: &[SessionRow]) -> UrgencyCounts {
    rows.iter()
        .fold(UrgencyCounts::default(), |mut counts, row| {
            match row.remaining.status {
                Urgency::Normal => counts.normal += 1,
                Urgency::Warning => counts.warning += 1,
                Urgency::Critical => counts.critical += 1,
                Urgency::Expired => counts.expired += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn active(id: i64, started_minutes_ago: i64, rate: f64, balance: f64) -> SessionRecord {
        SessionRecord {
            id,
            user_id: Some(100 + id),
            username: Some(format!("player{id}")),
            machine_name: Some(format!("PC-{id:02}")),
            machine_type: Some("PC".to_string()),
            start_time: Some((now() - Duration::minutes(started_minutes_ago)).to_rfc3339()),
            hourly_rate: Some(rate),
            user_balance: Some(balance),
            is_active: true,
            duration: None,
        }
    }

    #[test]
    fn test_rows_only_for_active_sessions() {
        let mut ended = active(2, 90, 5.0, 10.0);
        ended.is_active = false;

        let rows = session_rows(&[active(1, 60, 5.0, 10.0), ended], None, now());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].user, "player1");
        assert_eq!(rows[0].machine_display(), "PC-01 (PC)");
    }

    #[test]
    fn test_row_figures() {
        let rows = session_rows(&[active(1, 60, 5.0, 10.0)], None, now());
        let row = &rows[0];

        assert_eq!(row.remaining.hours, 1);
        assert_eq!(row.remaining.minutes, 0);
        assert_eq!(row.remaining.status, Urgency::Normal);
        assert_eq!(row.estimated_cost, Some(5.0));
        assert_eq!(row.cost_display(), "$5.00");
    }

    #[test]
    fn test_estimated_cost_rounds_up_partial_quarter() {
        // 61 minutes bills as 1.25 hours
        let rows = session_rows(&[active(1, 61, 4.0, 50.0)], None, now());
        assert_eq!(rows[0].cost_display(), "$5.00");
    }

    #[test]
    fn test_missing_rate_shows_unknown_cost_and_expired() {
        let mut record = active(1, 30, 5.0, 10.0);
        record.hourly_rate = None;

        let rows = session_rows(&[record], None, now());
        assert_eq!(rows[0].cost_display(), "-");
        assert_eq!(rows[0].remaining.status, Urgency::Expired);
    }

    #[test]
    fn test_unbillable_rate_shows_unknown_cost() {
        let mut negative = active(1, 10, 5.0, 10.0);
        negative.hourly_rate = Some(-2.0);
        let mut zero = active(2, 10, 5.0, 10.0);
        zero.hourly_rate = Some(0.0);

        let rows = session_rows(&[negative, zero], None, now());
        for row in &rows {
            assert_eq!(row.estimated_cost, None);
            assert_eq!(row.cost_display(), "-");
            assert_eq!(row.remaining.status, Urgency::Expired);
        }
    }

    #[test]
    fn test_viewer_balance_fills_missing_balance() {
        let mut record = active(1, 0, 6.0, 0.0);
        record.user_balance = None;
        let viewer = UserProfile {
            id: 101,
            balance: Some(3.0),
            ..Default::default()
        };

        let rows = session_rows(&[record], Some(&viewer), now());
        assert_eq!(rows[0].remaining.total_minutes, 30);
        assert_eq!(rows[0].remaining.status, Urgency::Warning);
    }

    #[test]
    fn test_urgency_counts() {
        let rows = session_rows(
            &[
                active(1, 0, 5.0, 100.0),
                active(2, 0, 4.0, 1.0),
                active(3, 0, 2.0, 0.9),
            ],
            None,
            now(),
        );
        let counts = urgency_counts(&rows);

        assert_eq!(counts.normal, 1);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.warning, 1);
        assert_eq!(counts.attention(), 2);
    }
}
