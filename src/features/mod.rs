//! Per-screen projections of backend data
//!
//! Each feature turns the latest fetched records plus the current instant
//! into plain rows the UI can draw without further computation.

pub mod dashboard;
pub mod machines;
pub mod profile;
pub mod sessions;

use chrono::{DateTime, Local, Utc};

/// Local wall-clock rendering of a start time, `-` when unknown
pub fn format_start(start: Option<DateTime<Utc>>) -> String {
    start
        .map(|start| start.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_start() {
        assert_eq!(format_start(None), "-");

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let rendered = format_start(Some(start));
        assert_eq!(rendered.len(), "2024-05-01 12:30".len());
        assert!(rendered.ends_with(":30"));
    }
}
