//! Machine list with rates, status and what the viewer's balance affords

pub mod data;

pub use data::{affordability_display, machine_rows, MachineRow, StatusCounts};
