use chrono::{DateTime, Local, Utc};

use crate::billing::{compute_estimated_cost, compute_time_remaining, format_cost, TimeRemaining};
use crate::cafe::models::parse_timestamp;
use crate::cafe::{SessionRecord, Transaction, UserProfile};
use crate::features::format_start;

/// One of the viewer's running sessions
#[derive(Debug, Clone, PartialEq)]
pub struct OwnSession {
    pub id: i64,
    pub machine: String,
    pub machine_type: String,
    pub started: String,
    pub remaining: TimeRemaining,
    pub estimated_cost: Option<f64>,
}

pub fn own_sessions(
    sessions: &[SessionRecord],
    viewer: &UserProfile,
    now: DateTime<Utc>,
) -> Vec<OwnSession> {
    sessions
        .iter()
        .filter(|session| session.is_active && session.belongs_to(viewer))
        .map(|session| {
            let snapshot = session.snapshot_for(Some(viewer));
            OwnSession {
                id: session.id,
                machine: session.machine_display().to_string(),
                machine_type: session.machine_type.clone().unwrap_or_default(),
                started: format_start(snapshot.start_time),
                remaining: compute_time_remaining(&snapshot, now),
                estimated_cost: snapshot
                    .start_time
                    .zip(snapshot.billable_rate())
                    .map(|(start, rate)| compute_estimated_cost(start, rate, now)),
            }
        })
        .collect()
}

/// One of the viewer's ended sessions
#[derive(Debug, Clone, PartialEq)]
pub struct PastSession {
    pub id: i64,
    pub machine: String,
    pub started: String,
    pub duration: String,
}

/// Ended sessions of `viewer`, newest first
pub fn past_sessions(sessions: &[SessionRecord], viewer: &UserProfile) -> Vec<PastSession> {
    let mut ended: Vec<&SessionRecord> = sessions
        .iter()
        .filter(|session| !session.is_active && session.belongs_to(viewer))
        .collect();
    ended.sort_by(|a, b| b.started_at().cmp(&a.started_at()).then(b.id.cmp(&a.id)));

    ended
        .into_iter()
        .map(|session| {
            let snapshot = session.snapshot();
            PastSession {
                id: session.id,
                machine: session.machine_display().to_string(),
                started: format_start(snapshot.start_time),
                duration: snapshot.duration_display(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub date: String,
    pub kind: &'static str,
    pub description: String,
    pub amount: f64,
    /// Signed money string: `+$10.00`, `-$2.50`, or `$0.00` for zero
    pub amount_display: String,
}

pub fn transaction_rows(transactions: &[Transaction]) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|transaction| {
            let date = transaction
                .timestamp
                .as_deref()
                .map(|raw| match parse_timestamp(raw) {
                    Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                    None => raw.to_string(),
                })
                .unwrap_or_else(|| "-".to_string());

            let sign = if transaction.amount > 0.0 {
                "+"
            } else if transaction.amount < 0.0 {
                "-"
            } else {
                ""
            };

            TransactionRow {
                date,
                kind: if transaction.is_deposit() { "Deposit" } else { "Usage" },
                description: transaction.description.clone().unwrap_or_default(),
                amount: transaction.amount,
                amount_display: format!("{sign}${}", format_cost(transaction.amount.abs())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::Urgency;
    use chrono::TimeZone;

    #[test]
    fn test_own_sessions_filters_other_users() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let viewer = UserProfile {
            id: 4,
            username: "neo".to_string(),
            balance: Some(5.0),
            ..Default::default()
        };
        let sessions = vec![
            SessionRecord {
                id: 1,
                user_id: Some(4),
                machine_name: Some("PC-07".to_string()),
                start_time: Some("2024-05-01T12:00:00Z".to_string()),
                hourly_rate: Some(6.0),
                is_active: true,
                ..Default::default()
            },
            SessionRecord {
                id: 2,
                user_id: Some(5),
                start_time: Some("2024-05-01T12:00:00Z".to_string()),
                hourly_rate: Some(6.0),
                user_balance: Some(20.0),
                is_active: true,
                ..Default::default()
            },
        ];

        let own = own_sessions(&sessions, &viewer, now);
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].machine, "PC-07");

        // $5 at $6/h, half an hour in: $2 left, 20 minutes
        assert_eq!(own[0].remaining.total_minutes, 20);
        assert_eq!(own[0].remaining.formatted, "00:20");
        assert_eq!(own[0].remaining.status, Urgency::Warning);
        assert_eq!(own[0].estimated_cost, Some(3.0));
    }

    #[test]
    fn test_transaction_rows() {
        let transactions = vec![
            Transaction {
                id: 1,
                amount: 10.0,
                transaction_type: Some("deposit".to_string()),
                description: Some("Top up".to_string()),
                timestamp: Some("not a date".to_string()),
            },
            Transaction {
                id: 2,
                amount: -2.5,
                transaction_type: Some("session".to_string()),
                description: None,
                timestamp: None,
            },
            Transaction {
                id: 3,
                amount: 0.0,
                transaction_type: Some("session".to_string()),
                description: Some("Free trial".to_string()),
                timestamp: None,
            },
        ];

        let rows = transaction_rows(&transactions);
        assert_eq!(rows[0].kind, "Deposit");
        assert_eq!(rows[0].amount_display, "+$10.00");
        assert_eq!(rows[0].date, "not a date");
        assert_eq!(rows[1].kind, "Usage");
        assert_eq!(rows[1].amount_display, "-$2.50");
        assert_eq!(rows[1].date, "-");
        assert_eq!(rows[1].description, "");
        assert_eq!(rows[2].amount_display, "$0.00");
    }

    #[test]
    fn test_own_session_with_unbillable_rate_has_no_cost() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 10, 0).unwrap();
        let viewer = UserProfile {
            id: 4,
            balance: Some(5.0),
            ..Default::default()
        };
        let sessions = vec![SessionRecord {
            id: 1,
            user_id: Some(4),
            start_time: Some("2024-05-01T12:00:00Z".to_string()),
            hourly_rate: Some(-2.0),
            is_active: true,
            ..Default::default()
        }];

        let own = own_sessions(&sessions, &viewer, now);
        assert_eq!(own[0].estimated_cost, None);
        assert_eq!(own[0].remaining.status, Urgency::Expired);
    }

    #[test]
    fn test_past_sessions_keep_viewers_ended_sessions() {
        let viewer = UserProfile {
            id: 4,
            ..Default::default()
        };
        let ended = |id, user_id, start: &str, duration| SessionRecord {
            id,
            user_id: Some(user_id),
            machine_name: Some(format!("PC-0{id}")),
            start_time: Some(start.to_string()),
            is_active: false,
            duration,
            ..Default::default()
        };
        let sessions = vec![
            ended(1, 4, "2024-05-01T09:00:00Z", Some(1.5)),
            ended(2, 5, "2024-05-01T10:00:00Z", Some(2.0)),
            ended(3, 4, "2024-05-02T09:00:00Z", None),
            SessionRecord {
                id: 4,
                user_id: Some(4),
                is_active: true,
                ..Default::default()
            },
        ];

        let past = past_sessions(&sessions, &viewer);
        assert_eq!(past.len(), 2);
        assert_eq!(past[0].id, 3);
        assert_eq!(past[0].duration, "N/A");
        assert_eq!(past[1].id, 1);
        assert_eq!(past[1].machine, "PC-01");
        assert_eq!(past[1].duration, "1.50 hours");
    }
}
