/// UI text lookup.
///
/// Only English ships today; every label goes through `t` so a second
/// table can be added without touching the drawing code.
#[derive(Debug, Clone, Default)]
pub struct I18n;

impl I18n {
    pub fn new() -> Self {
        Self
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        match key {
            "app.title" => "Cafe Console",

            // Tab names
            "tab.dashboard" => "Dashboard",
            "tab.sessions" => "Sessions",
            "tab.profile" => "Profile",
            "tab.machines" => "Machines",

            // Dashboard tab
            "dashboard.stats" => "Overview",
            "dashboard.utilization" => "Machine Utilization",
            "dashboard.in_use" => "In use",
            "dashboard.available" => "Available",
            "dashboard.maintenance" => "Maintenance",
            "dashboard.recent" => "Recent Sessions",
            "dashboard.no_recent" => "No recent sessions",

            // Sessions tab
            "sessions.active" => "Active Sessions",
            "sessions.header" => "ID   User         Machine              Started           Remaining  Est. Cost",
            "sessions.no_sessions" => "No active sessions",
            "sessions.attention" => "need attention",

            // Profile tab
            "profile.account" => "Account",
            "profile.username" => "Username:",
            "profile.email" => "Email:",
            "profile.role" => "Role:",
            "profile.balance" => "Balance:",
            "profile.current_session" => "Current Session",
            "profile.no_session" => "No active session",
            "profile.time_left" => "Time left:",
            "profile.cost" => "Cost so far:",
            "profile.transactions" => "Transactions",
            "profile.no_transactions" => "No transactions yet",
            "profile.history" => "Session History",
            "profile.no_history" => "No past sessions",
            "profile.signed_out" => "Not signed in. Set CAFE_TOKEN or CAFE_USERNAME/CAFE_PASSWORD.",

            // Machines tab
            "machines.list" => "Machines",
            "machines.header" => "Name             Type       Rate      Status        You can afford",
            "machines.no_machines" => "No machines registered",

            // Popups
            "confirm.title" => "Confirm",
            "confirm.end_session" => "End this session?",
            "confirm.start_session" => "Start a session on this machine?",
            "confirm.hint" => "Enter/y to confirm, Esc/n to cancel",

            // Status
            "status.loading" => "Loading...",
            "status.no_data" => "Waiting for first refresh",
            "status.last_error" => "Last refresh failed:",

            // Controls
            "controls.navigation" => "Navigation:",
            "controls.theme" => "Theme:",
            "controls.tabs" => "Tabs:",
            "controls.refresh" => "Refresh:",
            "controls.manual" => "manual",
            "controls.quit" => "quit",
            "controls.help" => "Help:",
            "controls.end" => "end session",
            "controls.start" => "start session",

            // Help
            "help.title" => "Help",
            "help.dashboard" => "Dashboard: cafe-wide figures, machine utilization and the latest sessions.",
            "help.sessions" => "Sessions: every running session with time left and cost so far. Press e to end the selected one.",
            "help.profile" => "Profile: your balance, your running session and recent transactions.",
            "help.machines" => "Machines: rates, availability and how long your balance lasts. Press s to start a session.",
            "help.countdown" => "Countdowns are recomputed locally between refreshes from the last fetched balance.",
            "help.urgency" => "Colours: green normal, amber 30 minutes or less, red 15 minutes or less.",
            "help.close" => "Press ? or Esc to close",

            _ => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys() {
        let i18n = I18n::new();
        assert_eq!(i18n.t("tab.sessions"), "Sessions");
        assert_eq!(i18n.t("controls.quit"), "quit");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let i18n = I18n::new();
        assert_eq!(i18n.t("missing.key"), "missing.key");
    }
}
