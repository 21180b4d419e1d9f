//! Backend access: wire models, the REST client and the periodic refresh task

pub mod client;
pub mod models;
pub mod refresh;

pub use client::CafeClient;
pub use models::{
    DashboardStats, Machine, MachineStatus, SessionRecord, StartSessionRequest, Transaction,
    UserProfile,
};
pub use refresh::{fetch_snapshot, CafeSnapshot, RefreshHandle, RefreshMessage};
