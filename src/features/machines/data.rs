use crate::billing::{affordable_hours, format_cost};
use crate::cafe::{Machine, MachineStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct MachineRow {
    pub id: i64,
    pub name: String,
    pub machine_type: String,
    pub hourly_rate: f64,
    pub status: MachineStatus,
    /// Hours the viewer's balance buys here, `None` without a known balance
    pub affordable_hours: Option<f64>,
}

impl MachineRow {
    pub fn rate_display(&self) -> String {
        format!("${}/h", format_cost(self.hourly_rate))
    }

    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Available
    }
}

pub fn machine_rows(machines: &[Machine], balance: Option<f64>) -> Vec<MachineRow> {
    machines
        .iter()
        .map(|machine| MachineRow {
            id: machine.id,
            name: machine.name.clone(),
            machine_type: machine.machine_type.clone(),
            hourly_rate: machine.hourly_rate,
            status: machine.status.clone(),
            affordable_hours: balance.map(|balance| affordable_hours(balance, machine.hourly_rate)),
        })
        .collect()
}

/// `"2.50 h"`, or a hint when the balance cannot pay for any time
pub fn affordability_display(hours: Option<f64>) -> String {
    match hours {
        None => "-".to_string(),
        Some(hours) if hours <= 0.0 => "insufficient balance".to_string(),
        Some(hours) => format!("{hours:.2} h"),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub available: usize,
    pub in_use: usize,
    pub maintenance: usize,
    pub other: usize,
}

impl StatusCounts {
    pub fn from_rows(rows: &[MachineRow]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, row| {
            match row.status {
                MachineStatus::Available => counts.available += 1,
                MachineStatus::InUse => counts.in_use += 1,
                MachineStatus::Maintenance => counts.maintenance += 1,
                MachineStatus::Other(_) => counts.other += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machines() -> Vec<Machine> {
        vec![
            Machine {
                id: 1,
                name: "PC-01".to_string(),
                machine_type: "PC".to_string(),
                hourly_rate: 3.0,
                status: MachineStatus::Available,
            },
            Machine {
                id: 2,
                name: "PS5-1".to_string(),
                machine_type: "Console".to_string(),
                hourly_rate: 4.0,
                status: MachineStatus::InUse,
            },
            Machine {
                id: 3,
                name: "VR-1".to_string(),
                machine_type: "VR".to_string(),
                hourly_rate: 0.0,
                status: MachineStatus::Maintenance,
            },
        ]
    }

    #[test]
    fn test_affordable_hours_per_machine() {
        let rows = machine_rows(&machines(), Some(10.0));

        assert_eq!(rows[0].affordable_hours, Some(3.33));
        assert_eq!(rows[1].affordable_hours, Some(2.5));
        assert_eq!(rows[2].affordable_hours, Some(0.0));
        assert_eq!(rows[0].rate_display(), "$3.00/h");
        assert!(rows[0].is_available());
        assert!(!rows[1].is_available());
    }

    #[test]
    fn test_unknown_balance() {
        let rows = machine_rows(&machines(), None);
        assert!(rows.iter().all(|row| row.affordable_hours.is_none()));
        assert_eq!(affordability_display(rows[0].affordable_hours), "-");
    }

    #[test]
    fn test_affordability_display() {
        assert_eq!(affordability_display(Some(2.5)), "2.50 h");
        assert_eq!(affordability_display(Some(0.0)), "insufficient balance");
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts::from_rows(&machine_rows(&machines(), None));
        assert_eq!(counts.available, 1);
        assert_eq!(counts.in_use, 1);
        assert_eq!(counts.maintenance, 1);
        assert_eq!(counts.other, 0);
    }
}
