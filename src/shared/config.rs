use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR_NAME: &str = "cafe-console";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 2;
pub const MIN_TICK_INTERVAL_SECS: u64 = 1;

/// Theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
    Ocean,
}

impl ThemeMode {
    pub fn next(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Ocean,
            ThemeMode::Ocean => ThemeMode::Dark,
        }
    }
}

/// Sign-in details taken from the environment. Never written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,
    /// Seconds between backend fetches (minimum 2, default 30)
    pub refresh_interval_secs: u64,
    /// Seconds between countdown recomputations (minimum 1, default 15)
    pub tick_interval_secs: u64,
    pub current_tab: usize,
    pub theme_mode: ThemeMode,
    pub show_help: bool,

    #[serde(skip)]
    pub token: Option<String>,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval_secs: 30,
            tick_interval_secs: 15,
            current_tab: 0,
            theme_mode: ThemeMode::default(),
            show_help: false,
            token: None,
            credentials: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`. A missing or unreadable file yields
    /// the defaults, which are written back.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(config) => config.normalized(),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "invalid config, using defaults");
                    let config = Config::default();
                    let _ = config.save_to(path);
                    config
                }
            },
            Err(_) => {
                let config = Config::default();
                let _ = config.save_to(path);
                config
            }
        };

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/cafe-console`, falling back to `~/.config/cafe-console`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config),
            _ => dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
                .join(".config"),
        };

        let app_config_dir = config_dir.join(APP_DIR_NAME);
        fs::create_dir_all(&app_config_dir)?;
        Ok(app_config_dir)
    }

    /// `config.json` inside [`Config::config_dir`]
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Apply `CAFE_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`: `CAFE_API_URL`, `CAFE_TOKEN` and the
    /// `CAFE_USERNAME`/`CAFE_PASSWORD` pair
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_url) = value("CAFE_API_URL") {
            self.api_url = api_url;
        }
        if let Some(token) = value("CAFE_TOKEN") {
            self.token = Some(token);
        }
        if let (Some(username), Some(password)) = (value("CAFE_USERNAME"), value("CAFE_PASSWORD")) {
            self.credentials = Some(Credentials { username, password });
        }
    }

    fn normalized(mut self) -> Self {
        self.refresh_interval_secs = self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS);
        self.tick_interval_secs = self.tick_interval_secs.max(MIN_TICK_INTERVAL_SECS);
        if self.api_url.trim().is_empty() {
            self.api_url = DEFAULT_API_URL.to_string();
        }
        self
    }

    /// Set refresh interval with validation (minimum 2 seconds)
    pub fn set_refresh_interval(&mut self, seconds: u64) {
        if seconds >= MIN_REFRESH_INTERVAL_SECS {
            self.refresh_interval_secs = seconds;
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(MIN_TICK_INTERVAL_SECS))
    }

    pub fn set_current_tab(&mut self, tab_index: usize) {
        self.current_tab = tab_index;
    }

    pub fn cycle_theme(&mut self) {
        self.theme_mode = self.theme_mode.next();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn refresh_interval_display(&self) -> String {
        format_interval(self.refresh_interval_secs)
    }

    pub fn theme_display(&self) -> &'static str {
        match self.theme_mode {
            ThemeMode::Dark => "Dark",
            ThemeMode::Light => "Light",
            ThemeMode::Ocean => "Ocean",
        }
    }
}

fn format_interval(seconds: u64) -> String {
    if seconds >= 60 && seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{seconds}s")
    }
}

/// Get refresh interval from key press
pub fn get_refresh_interval_from_key(key: char) -> Option<u64> {
    match key {
        '1' => Some(10),
        '2' => Some(15),
        '3' => Some(30),
        '4' => Some(60),
        '5' => Some(120),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://127.0.0.1:5000");
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.tick_interval_secs, 15);
        assert_eq!(config.current_tab, 0);
        assert_eq!(config.theme_mode, ThemeMode::Dark);
        assert!(!config.show_help);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_missing_file_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload_keeps_settings_but_not_secrets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.api_url = "http://cafe.local:8080".to_string();
        config.set_refresh_interval(60);
        config.cycle_theme();
        config.token = Some("secret-token".to_string());
        config.credentials = Some(Credentials {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        });
        config.save_to(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("secret-token"));
        assert!(!raw.contains("hunter2"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "http://cafe.local:8080");
        assert_eq!(loaded.refresh_interval_secs, 60);
        assert_eq!(loaded.theme_mode, ThemeMode::Light);
        assert!(loaded.token.is_none());
        assert!(loaded.credentials.is_none());
    }

    #[test]
    fn test_partial_and_out_of_range_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"refresh_interval_secs": 0, "tick_interval_secs": 0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.refresh_interval_secs, MIN_REFRESH_INTERVAL_SECS);
        assert_eq!(config.tick_interval_secs, MIN_TICK_INTERVAL_SECS);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.refresh_interval_secs, 30);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<Config>(&rewritten).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("CAFE_API_URL", "https://cafe.example"),
            ("CAFE_TOKEN", "abc"),
            ("CAFE_USERNAME", "admin"),
            ("CAFE_PASSWORD", "pw"),
        ]));

        assert_eq!(config.api_url, "https://cafe.example");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(
            config.credentials,
            Some(Credentials {
                username: "admin".to_string(),
                password: "pw".to_string(),
            })
        );
    }

    #[test]
    fn test_env_overrides_need_both_credentials_and_ignore_blanks() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("CAFE_USERNAME", "admin"), ("CAFE_API_URL", "  ")]));

        assert!(config.credentials.is_none());
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_refresh_interval_validation() {
        let mut config = Config::default();

        config.set_refresh_interval(2);
        assert_eq!(config.refresh_interval_secs, 2);

        config.set_refresh_interval(60);
        assert_eq!(config.refresh_interval_secs, 60);

        config.set_refresh_interval(1);
        assert_eq!(config.refresh_interval_secs, 60);
    }

    #[test]
    fn test_interval_display() {
        let mut config = Config::default();
        assert_eq!(config.refresh_interval_display(), "30s");

        config.set_refresh_interval(60);
        assert_eq!(config.refresh_interval_display(), "1m");

        config.set_refresh_interval(90);
        assert_eq!(config.refresh_interval_display(), "90s");

        config.set_refresh_interval(120);
        assert_eq!(config.refresh_interval_display(), "2m");
    }

    #[test]
    fn test_theme_cycle() {
        let mut config = Config::default();
        config.cycle_theme();
        assert_eq!(config.theme_display(), "Light");
        config.cycle_theme();
        assert_eq!(config.theme_display(), "Ocean");
        config.cycle_theme();
        assert_eq!(config.theme_display(), "Dark");
    }

    #[test]
    fn test_get_refresh_interval_from_key() {
        assert_eq!(get_refresh_interval_from_key('1'), Some(10));
        assert_eq!(get_refresh_interval_from_key('3'), Some(30));
        assert_eq!(get_refresh_interval_from_key('5'), Some(120));
        assert_eq!(get_refresh_interval_from_key('6'), None);
        assert_eq!(get_refresh_interval_from_key('a'), None);
    }
}
