//! Dashboard summary: stat tiles, machine utilization and recent sessions

pub mod data;

pub use data::{recent_rows, stat_tiles, MachineUtilization, RecentSessionRow, RecentTiming, StatTile};
