use chrono::{DateTime, Utc};

use crate::billing::{compute_time_remaining, format_cost, TimeRemaining};
use crate::cafe::models::MachineStats;
use crate::cafe::{DashboardStats, UserProfile};
use crate::features::format_start;

/// Headline number on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
}

impl StatTile {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Tiles for the signed-in role. Administrators see cafe-wide figures,
/// everyone else sees their own balance first.
pub fn stat_tiles(stats: &DashboardStats, viewer: Option<&UserProfile>) -> Vec<StatTile> {
    let is_admin = viewer.map(|viewer| viewer.is_admin).unwrap_or(false);
    let mut tiles = Vec::with_capacity(4);

    if is_admin {
        let users = stats
            .user_stats
            .total_users
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        tiles.push(StatTile::new("Total Users", users));
    } else {
        let balance = stats
            .user_stats
            .balance
            .or_else(|| viewer.and_then(|viewer| viewer.balance));
        let balance = match balance {
            Some(balance) => format!("${}", format_cost(balance)),
            None => "-".to_string(),
        };
        tiles.push(StatTile::new("Your Balance", balance));
    }

    tiles.push(StatTile::new(
        "Available Machines",
        format!(
            "{}/{}",
            stats.machine_stats.available_machines, stats.machine_stats.total_machines
        ),
    ));
    tiles.push(StatTile::new(
        "Active Sessions",
        stats.session_stats.active_sessions.to_string(),
    ));

    if is_admin {
        tiles.push(StatTile::new(
            "Today's Revenue",
            format!("${}", format_cost(stats.revenue_stats.daily_revenue)),
        ));
    }

    tiles
}

/// Share of machines in each state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineUtilization {
    pub total: u64,
    pub available: u64,
    pub in_use: u64,
    pub maintenance: u64,
}

impl From<&MachineStats> for MachineUtilization {
    fn from(stats: &MachineStats) -> Self {
        Self {
            total: stats.total_machines,
            available: stats.available_machines,
            in_use: stats.in_use_machines,
            maintenance: stats.maintenance_machines,
        }
    }
}

impl MachineUtilization {
    /// Percentage of the fleet `count` represents, 0 for an empty fleet
    pub fn share(&self, count: u64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (count as f64 / self.total as f64 * 100.0).min(100.0)
    }

    pub fn in_use_percentage(&self) -> f64 {
        self.share(self.in_use)
    }
}

/// Time column of a recent session
#[derive(Debug, Clone, PartialEq)]
pub enum RecentTiming {
    Running(TimeRemaining),
    Ended(String),
}

impl RecentTiming {
    pub fn display(&self) -> String {
        match self {
            RecentTiming::Running(remaining) => format!("{} left", remaining.short_display()),
            RecentTiming::Ended(duration) => duration.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentSessionRow {
    pub user: String,
    pub machine: String,
    pub started: String,
    pub timing: RecentTiming,
}

/// Recent sessions, running ones with a live countdown
pub fn recent_rows(
    stats: &DashboardStats,
    viewer: Option<&UserProfile>,
    now: DateTime<Utc>,
) -> Vec<RecentSessionRow> {
    stats
        .recent_sessions
        .iter()
        .map(|session| {
            let snapshot = session.snapshot_for(viewer);
            let timing = if snapshot.is_active {
                RecentTiming::Running(compute_time_remaining(&snapshot, now))
            } else {
                RecentTiming::Ended(snapshot.duration_display())
            };

            RecentSessionRow {
                user: session.username_display().to_string(),
                machine: session.machine_display().to_string(),
                started: format_start(snapshot.start_time),
                timing,
            }
        })
        .collect()
}
