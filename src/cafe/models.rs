use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::ApiError;
use crate::billing::SessionSnapshot;

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, RFC 2822 (Flask's default datetime rendering) and naive
/// ISO datetimes, which the backend writes in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(raw) {
        return Some(datetime.with_timezone(&Utc));
    }

    raw.replacen(' ', "T", 1)
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Session as returned by the session listing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub user_balance: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    /// Recorded length in hours once the session has ended
    #[serde(default)]
    pub duration: Option<f64>,
}

impl SessionRecord {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_timestamp)
    }

    pub fn username_display(&self) -> &str {
        self.username.as_deref().unwrap_or("-")
    }

    pub fn machine_display(&self) -> &str {
        self.machine_name.as_deref().unwrap_or("-")
    }

    /// Billing snapshot of this record
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            start_time: self.started_at(),
            hourly_rate: self.hourly_rate,
            user_balance: self.user_balance,
            is_active: self.is_active,
            duration_hours: self.duration,
        }
    }

    /// Billing snapshot as seen by `viewer`: when the record carries no
    /// balance and the session is the viewer's own, the viewer's balance is
    /// used instead.
    pub fn snapshot_for(&self, viewer: Option<&UserProfile>) -> SessionSnapshot {
        let mut snapshot = self.snapshot();
        if snapshot.user_balance.is_none() {
            snapshot.user_balance = viewer
                .filter(|viewer| Some(viewer.id) == self.user_id)
                .and_then(|viewer| viewer.balance);
        }
        snapshot
    }

    pub fn belongs_to(&self, user: &UserProfile) -> bool {
        self.user_id == Some(user.id)
    }
}

/// Machine availability as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MachineStatus {
    #[default]
    Available,
    InUse,
    Maintenance,
    Other(String),
}

impl From<String> for MachineStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "available" => MachineStatus::Available,
            "in use" => MachineStatus::InUse,
            "maintenance" => MachineStatus::Maintenance,
            _ => MachineStatus::Other(raw),
        }
    }
}

impl From<MachineStatus> for String {
    fn from(status: MachineStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineStatus::Available => write!(f, "Available"),
            MachineStatus::InUse => write!(f, "In Use"),
            MachineStatus::Maintenance => write!(f, "Maintenance"),
            MachineStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Bookable computer or console
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub machine_type: String,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub status: MachineStatus,
}

/// Account of the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn role_display(&self) -> &'static str {
        if self.is_admin {
            "Administrator"
        } else {
            "User"
        }
    }
}

/// Balance movement on the signed-in account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Transaction {
    pub fn is_deposit(&self) -> bool {
        self.transaction_type.as_deref() == Some("deposit")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserStats {
    /// Present for administrators
    pub total_users: Option<u64>,
    /// Present for regular users
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MachineStats {
    pub total_machines: u64,
    pub available_machines: u64,
    pub in_use_machines: u64,
    pub maintenance_machines: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionStats {
    pub active_sessions: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevenueStats {
    pub daily_revenue: f64,
}

/// Payload of the dashboard statistics endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardStats {
    pub user_stats: UserStats,
    pub machine_stats: MachineStats,
    pub session_stats: SessionStats,
    pub revenue_stats: RevenueStats,
    pub recent_sessions: Vec<SessionRecord>,
}

/// Validated body for starting a session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StartSessionRequest {
    pub user_id: i64,
    pub machine_id: i64,
}

impl StartSessionRequest {
    /// Build a request for `user` on `machine`, rejecting what the backend
    /// would refuse anyway
    pub fn new(user: &UserProfile, machine: &Machine) -> Result<Self, ApiError> {
        if machine.status != MachineStatus::Available {
            return Err(ApiError::MachineUnavailable(machine.name.clone()));
        }
        if user.balance.unwrap_or(0.0) <= 0.0 {
            return Err(ApiError::InsufficientBalance);
        }

        Ok(Self {
            user_id: user.id,
            machine_id: machine.id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionsEnvelope {
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionEnvelope {
    #[serde(default)]
    pub session: Option<SessionRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MachinesEnvelope {
    #[serde(default)]
    pub machines: Vec<Machine>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionsEnvelope {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Error body shape shared by all endpoints
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|text| !text.is_empty())
    }
}
