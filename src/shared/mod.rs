/// Shared modules used across the application
pub mod config;
pub mod i18n;
pub mod theme;

pub use config::Config;
pub use i18n::I18n;
pub use theme::ModernTheme;
