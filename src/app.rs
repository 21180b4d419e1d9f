use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cafe::{
    fetch_snapshot, CafeClient, CafeSnapshot, RefreshHandle, RefreshMessage, StartSessionRequest,
    UserProfile,
};
use crate::features::{
    dashboard::{self, RecentSessionRow, StatTile},
    machines::{self, MachineRow},
    profile::{self, OwnSession, PastSession, TransactionRow},
    sessions::{self, SessionRow},
};
use crate::shared::{self, Config, I18n, ModernTheme};
use crate::ui;

/// Available tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard = 0,
    Sessions = 1,
    Profile = 2,
    Machines = 3,
}

impl Tab {
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Tab::Sessions,
            2 => Tab::Profile,
            3 => Tab::Machines,
            _ => Tab::Dashboard,
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            Tab::Dashboard => "tab.dashboard",
            Tab::Sessions => "tab.sessions",
            Tab::Profile => "tab.profile",
            Tab::Machines => "tab.machines",
        }
    }

    pub fn count() -> usize {
        4
    }
}

/// Loading indicators
#[derive(Debug)]
pub struct LoadingStates {
    pub data_refresh: bool,
    pub action_in_flight: bool,
    pub spinner_frame: usize,
    pub last_spinner_update: Instant,
}

impl LoadingStates {
    pub fn new() -> Self {
        Self {
            data_refresh: true,
            action_in_flight: false,
            spinner_frame: 0,
            last_spinner_update: Instant::now(),
        }
    }

    pub fn get_spinner_char(&mut self) -> char {
        const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

        if self.last_spinner_update.elapsed().as_millis() > 100 {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
            self.last_spinner_update = Instant::now();
        }

        SPINNER_CHARS[self.spinner_frame]
    }

    pub fn is_loading(&self) -> bool {
        self.data_refresh || self.action_in_flight
    }
}

/// Status message for user feedback
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub timestamp: Instant,
    pub message_type: StatusType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusType {
    fn max_age(&self) -> Duration {
        match self {
            StatusType::Info | StatusType::Success => Duration::from_secs(2),
            StatusType::Warning | StatusType::Error => Duration::from_secs(5),
        }
    }
}

/// Backend write waiting for the user to confirm
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    EndSession {
        session_id: i64,
        description: String,
    },
    StartSession {
        request: StartSessionRequest,
        description: String,
    },
}

impl PendingAction {
    pub fn prompt_key(&self) -> &'static str {
        match self {
            PendingAction::EndSession { .. } => "confirm.end_session",
            PendingAction::StartSession { .. } => "confirm.start_session",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            PendingAction::EndSession { description, .. }
            | PendingAction::StartSession { description, .. } => description,
        }
    }
}

/// Result of a confirmed backend write
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Completed(String),
    Failed(String),
}

/// Main application state
pub struct App {
    pub should_quit: bool,
    client: CafeClient,
    pub config: Config,
    /// Where settings are persisted; `None` keeps them in memory only
    config_path: Option<PathBuf>,
    pub theme: ModernTheme,
    pub i18n: I18n,
    /// Latest successful fetch
    pub snapshot: Option<CafeSnapshot>,
    /// Message of the most recent failed fetch, cleared by the next success
    pub last_error: Option<String>,
    /// Instant every countdown on screen is computed for
    pub now: DateTime<Utc>,
    last_tick: Instant,
    last_refresh: Instant,
    pub next_refresh_in: Duration,
    pub current_tab: Tab,
    pub selected_session: usize,
    pub selected_machine: usize,
    pub pending_action: Option<PendingAction>,
    needs_redraw: bool,
    pub loading_states: LoadingStates,
    pub status_message: Option<StatusMessage>,
    refresh: RefreshHandle,
    refresh_rx: mpsc::UnboundedReceiver<RefreshMessage>,
    action_tx: mpsc::UnboundedSender<ActionOutcome>,
    action_rx: mpsc::UnboundedReceiver<ActionOutcome>,
}

impl App {
    /// Build the app and start the background refresh task. Must be called
    /// inside a tokio runtime.
    pub fn new(config: Config, config_path: Option<PathBuf>, client: CafeClient) -> Self {
        let theme = ModernTheme::from_mode(config.theme_mode);
        let current_tab = Tab::from_index(config.current_tab);

        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let fetch_client = client.clone();
        let refresh = RefreshHandle::spawn(
            config.refresh_interval(),
            move || {
                let client = fetch_client.clone();
                async move { fetch_snapshot(&client).await }
            },
            refresh_tx,
        );

        let mut app = Self {
            should_quit: false,
            client,
            config,
            config_path,
            theme,
            i18n: I18n::new(),
            snapshot: None,
            last_error: None,
            now: Utc::now(),
            last_tick: Instant::now(),
            last_refresh: Instant::now(),
            next_refresh_in: Duration::from_secs(0),
            current_tab,
            selected_session: 0,
            selected_machine: 0,
            pending_action: None,
            needs_redraw: true,
            loading_states: LoadingStates::new(),
            status_message: None,
            refresh,
            refresh_rx,
            action_tx,
            action_rx,
        };

        if !app.client.is_authenticated() {
            app.show_status("Not signed in", StatusType::Warning);
        }
        app
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        if !IsTty::is_tty(&io::stdout()) {
            eprintln!("This application requires a TTY terminal to run.");
            return Ok(());
        }

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        self.cleanup();

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            if self.loading_states.is_loading() {
                self.loading_states.get_spinner_char();
                self.needs_redraw = true;
            }

            self.drain_background_messages();

            if self.last_tick.elapsed() >= self.config.tick_interval() {
                self.tick(Utc::now());
            }

            let next_refresh_in = self
                .config
                .refresh_interval()
                .saturating_sub(self.last_refresh.elapsed());
            if next_refresh_in.as_secs() != self.next_refresh_in.as_secs() {
                self.needs_redraw = true;
            }
            self.next_refresh_in = next_refresh_in;

            self.update_status_message();

            if self.needs_redraw {
                terminal.draw(|f| ui::draw(f, self))?;
                self.needs_redraw = false;
            }

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code)?;
                        self.needs_redraw = true;
                    }
                }
            }
        }

        Ok(())
    }

    /// Advance the display clock; every countdown is recomputed from it
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.last_tick = Instant::now();
        self.needs_redraw = true;
    }

    fn drain_background_messages(&mut self) {
        while let Ok(message) = self.refresh_rx.try_recv() {
            self.apply_refresh_message(message);
        }
        while let Ok(outcome) = self.action_rx.try_recv() {
            self.apply_action_outcome(outcome);
        }
    }

    pub fn apply_refresh_message(&mut self, message: RefreshMessage) {
        match message {
            RefreshMessage::Completed(snapshot) => {
                self.snapshot = Some(*snapshot);
                self.last_error = None;
                self.clamp_selections();
            }
            RefreshMessage::Failed(error) => {
                self.show_status(&format!("Refresh failed: {error}"), StatusType::Error);
                self.last_error = Some(error);
            }
        }

        self.loading_states.data_refresh = false;
        self.last_refresh = Instant::now();
        self.tick(Utc::now());
    }

    fn apply_action_outcome(&mut self, outcome: ActionOutcome) {
        self.loading_states.action_in_flight = false;
        match outcome {
            ActionOutcome::Completed(text) => {
                self.show_status(&text, StatusType::Success);
                self.trigger_refresh();
            }
            ActionOutcome::Failed(text) => self.show_status(&text, StatusType::Error),
        }
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyCode) -> Result<()> {
        if self.pending_action.is_some() {
            match key {
                KeyCode::Enter | KeyCode::Char('y') => self.confirm_pending_action(),
                KeyCode::Esc | KeyCode::Char('n') => self.pending_action = None,
                _ => {}
            }
            return Ok(());
        }

        if self.config.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc) {
                self.toggle_help();
            }
            return Ok(());
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.prev_tab(),
            KeyCode::Char('r') => self.trigger_refresh(),
            KeyCode::Char(c @ '1'..='5') => self.handle_refresh_interval_key(c),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('e') if self.current_tab == Tab::Sessions => {
                self.request_end_selected_session()
            }
            KeyCode::Char('s') if self.current_tab == Tab::Machines => {
                self.request_start_on_selected_machine()
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_refresh_interval_key(&mut self, key: char) {
        if let Some(interval) = shared::config::get_refresh_interval_from_key(key) {
            self.config.set_refresh_interval(interval);
            self.save_config();
            self.refresh.set_interval(self.config.refresh_interval());
            self.last_refresh = Instant::now();
            self.show_status(
                &format!("Refreshing every {}", self.config.refresh_interval_display()),
                StatusType::Info,
            );
        }
    }

    /// Fetch now instead of waiting for the next scheduled refresh
    pub fn trigger_refresh(&mut self) {
        if self.loading_states.data_refresh {
            return;
        }
        if self.refresh.refresh_now() {
            self.loading_states.data_refresh = true;
        } else {
            self.show_status("Refresh task stopped", StatusType::Error);
        }
    }

    fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.config.set_current_tab(tab as usize);
        self.save_config();
    }

    fn next_tab(&mut self) {
        self.set_tab(Tab::from_index((self.current_tab as usize + 1) % Tab::count()));
    }

    fn prev_tab(&mut self) {
        let index = self.current_tab as usize;
        self.set_tab(Tab::from_index((index + Tab::count() - 1) % Tab::count()));
    }

    fn selection_len(&self) -> usize {
        match self.current_tab {
            Tab::Sessions => self.active_session_count(),
            Tab::Machines => self.snapshot.as_ref().map_or(0, |snapshot| snapshot.machines.len()),
            Tab::Dashboard | Tab::Profile => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Sessions => Some(&mut self.selected_session),
            Tab::Machines => Some(&mut self.selected_machine),
            Tab::Dashboard | Tab::Profile => None,
        }
    }

    fn move_selection_down(&mut self) {
        let len = self.selection_len();
        if len == 0 {
            return;
        }
        if let Some(selected) = self.selection_mut() {
            *selected = (*selected + 1) % len;
        }
    }

    fn move_selection_up(&mut self) {
        let len = self.selection_len();
        if len == 0 {
            return;
        }
        if let Some(selected) = self.selection_mut() {
            *selected = if *selected == 0 { len - 1 } else { *selected - 1 };
        }
    }

    fn clamp_selections(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let sessions = snapshot
            .active_sessions
            .iter()
            .filter(|session| session.is_active)
            .count();
        let machines = snapshot.machines.len();

        self.selected_session = self.selected_session.min(sessions.saturating_sub(1));
        self.selected_machine = self.selected_machine.min(machines.saturating_sub(1));
    }

    fn request_end_selected_session(&mut self) {
        let Some(row) = self.session_rows().into_iter().nth(self.selected_session) else {
            self.show_status("No session selected", StatusType::Warning);
            return;
        };

        self.pending_action = Some(PendingAction::EndSession {
            session_id: row.id,
            description: format!(
                "{} on {} ({} left)",
                row.user,
                row.machine,
                row.remaining.short_display()
            ),
        });
    }

    fn request_start_on_selected_machine(&mut self) {
        let Some(viewer) = self.viewer().cloned() else {
            self.show_status("Sign in to start a session", StatusType::Warning);
            return;
        };
        let Some(machine) = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.machines.get(self.selected_machine))
            .cloned()
        else {
            self.show_status("No machine selected", StatusType::Warning);
            return;
        };

        match StartSessionRequest::new(&viewer, &machine) {
            Ok(request) => {
                self.pending_action = Some(PendingAction::StartSession {
                    request,
                    description: format!("{} for {}", machine.name, viewer.username),
                });
            }
            Err(err) => self.show_status(&err.to_string(), StatusType::Error),
        }
    }

    fn confirm_pending_action(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };

        info!(?action, "running confirmed action");
        self.loading_states.action_in_flight = true;

        let client = self.client.clone();
        let outcome_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = match action {
                PendingAction::EndSession { session_id, .. } => {
                    match client.end_session(session_id).await {
                        Ok(()) => ActionOutcome::Completed("Session ended".to_string()),
                        Err(err) => ActionOutcome::Failed(format!("Could not end session: {err}")),
                    }
                }
                PendingAction::StartSession { request, .. } => {
                    match client.start_session(&request).await {
                        Ok(_) => ActionOutcome::Completed("Session started".to_string()),
                        Err(err) => {
                            ActionOutcome::Failed(format!("Could not start session: {err}"))
                        }
                    }
                }
            };
            if let ActionOutcome::Failed(ref text) = outcome {
                warn!("{text}");
            }
            let _ = outcome_tx.send(outcome);
        });
    }

    fn toggle_theme(&mut self) {
        self.config.cycle_theme();
        self.theme = ModernTheme::from_mode(self.config.theme_mode);
        self.save_config();
        self.show_status(
            &format!("Changed theme to {}", self.config.theme_display()),
            StatusType::Success,
        );
    }

    fn toggle_help(&mut self) {
        self.config.toggle_help();
        self.save_config();
    }

    fn save_config(&self) {
        if let Some(path) = &self.config_path {
            if let Err(err) = self.config.save_to(path) {
                warn!(error = %err, "could not save config");
            }
        }
    }

    pub fn current_theme(&self) -> &ModernTheme {
        &self.theme
    }

    /// Signed-in user, once the first fetch has succeeded
    pub fn viewer(&self) -> Option<&UserProfile> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.profile.as_ref())
    }

    pub fn backend_url(&self) -> &str {
        self.client.base_url()
    }

    /// Sessions still flagged active in the last snapshot
    pub fn active_session_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |snapshot| {
            snapshot
                .active_sessions
                .iter()
                .filter(|session| session.is_active)
                .count()
        })
    }

    pub fn session_rows(&self) -> Vec<SessionRow> {
        match &self.snapshot {
            Some(snapshot) => sessions::session_rows(&snapshot.active_sessions, self.viewer(), self.now),
            None => Vec::new(),
        }
    }

    pub fn machine_rows(&self) -> Vec<MachineRow> {
        match &self.snapshot {
            Some(snapshot) => machines::machine_rows(
                &snapshot.machines,
                self.viewer().and_then(|viewer| viewer.balance),
            ),
            None => Vec::new(),
        }
    }

    pub fn own_sessions(&self) -> Vec<OwnSession> {
        match (&self.snapshot, self.viewer()) {
            (Some(snapshot), Some(viewer)) => {
                profile::own_sessions(&snapshot.active_sessions, viewer, self.now)
            }
            _ => Vec::new(),
        }
    }

    pub fn past_sessions(&self) -> Vec<PastSession> {
        match (&self.snapshot, self.viewer()) {
            (Some(snapshot), Some(viewer)) => {
                profile::past_sessions(&snapshot.session_history, viewer)
            }
            _ => Vec::new(),
        }
    }

    pub fn transaction_rows(&self) -> Vec<TransactionRow> {
        self.snapshot
            .as_ref()
            .map(|snapshot| profile::transaction_rows(&snapshot.transactions))
            .unwrap_or_default()
    }

    pub fn stat_tiles(&self) -> Vec<StatTile> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.stats.as_ref())
            .map(|stats| dashboard::stat_tiles(stats, self.viewer()))
            .unwrap_or_default()
    }

    pub fn recent_rows(&self) -> Vec<RecentSessionRow> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.stats.as_ref())
            .map(|stats| dashboard::recent_rows(stats, self.viewer(), self.now))
            .unwrap_or_default()
    }

    pub fn show_status(&mut self, text: &str, status_type: StatusType) {
        self.status_message = Some(StatusMessage {
            text: text.to_string(),
            timestamp: Instant::now(),
            message_type: status_type,
        });
        self.needs_redraw = true;
    }

    /// Clear the status message once it has been shown long enough
    pub fn update_status_message(&mut self) {
        if let Some(ref msg) = self.status_message {
            if msg.timestamp.elapsed() > msg.message_type.max_age() {
                self.status_message = None;
                self.needs_redraw = true;
            }
        }
    }

    fn cleanup(&mut self) {
        self.refresh.shutdown();
        self.save_config();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::Urgency;
    use crate::cafe::{Machine, MachineStatus, SessionRecord};
    use chrono::TimeZone;
    use tokio::time::timeout;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn test_app() -> App {
        let client = CafeClient::new("http://127.0.0.1:9").unwrap();
        App::new(Config::default(), None, client)
    }

    fn snapshot(session_count: i64, balance: f64) -> CafeSnapshot {
        let mut snapshot = CafeSnapshot::empty(start());
        snapshot.active_sessions = (1..=session_count)
            .map(|id| SessionRecord {
                id,
                user_id: Some(id),
                username: Some(format!("user{id}")),
                machine_name: Some(format!("PC-{id:02}")),
                start_time: Some(start().to_rfc3339()),
                hourly_rate: Some(4.0),
                user_balance: Some(4.0),
                is_active: true,
                ..Default::default()
            })
            .collect();
        snapshot.machines = vec![
            Machine {
                id: 1,
                name: "PC-01".to_string(),
                machine_type: "PC".to_string(),
                hourly_rate: 4.0,
                status: MachineStatus::Available,
            },
            Machine {
                id: 2,
                name: "PC-02".to_string(),
                machine_type: "PC".to_string(),
                hourly_rate: 4.0,
                status: MachineStatus::InUse,
            },
        ];
        snapshot.profile = Some(UserProfile {
            id: 1,
            username: "user1".to_string(),
            balance: Some(balance),
            ..Default::default()
        });
        snapshot
    }

    fn loaded_app(session_count: i64, balance: f64) -> App {
        let mut app = test_app();
        app.apply_refresh_message(RefreshMessage::Completed(Box::new(snapshot(
            session_count,
            balance,
        ))));
        app.tick(start());
        app
    }

    #[test]
    fn test_tab_from_index() {
        assert_eq!(Tab::from_index(0), Tab::Dashboard);
        assert_eq!(Tab::from_index(3), Tab::Machines);
        assert_eq!(Tab::from_index(42), Tab::Dashboard);
    }

    #[tokio::test]
    async fn test_tab_cycle_wraps() {
        let mut app = test_app();
        assert_eq!(app.current_tab, Tab::Dashboard);

        app.handle_key_event(KeyCode::BackTab).unwrap();
        assert_eq!(app.current_tab, Tab::Machines);

        app.handle_key_event(KeyCode::Tab).unwrap();
        app.handle_key_event(KeyCode::Tab).unwrap();
        assert_eq!(app.current_tab, Tab::Sessions);
        assert_eq!(app.config.current_tab, 1);
    }

    #[tokio::test]
    async fn test_countdown_follows_tick() {
        let mut app = loaded_app(1, 10.0);
        assert_eq!(app.session_rows()[0].remaining.total_minutes, 60);

        app.tick(start() + chrono::Duration::minutes(45));
        let row = &app.session_rows()[0];
        assert_eq!(row.remaining.total_minutes, 15);
        assert_eq!(row.remaining.status, Urgency::Critical);
    }

    #[tokio::test]
    async fn test_active_count_skips_ended_records() {
        let mut snapshot = snapshot(3, 10.0);
        snapshot.active_sessions[1].is_active = false;
        let mut app = test_app();
        assert_eq!(app.active_session_count(), 0);

        app.apply_refresh_message(RefreshMessage::Completed(Box::new(snapshot)));
        assert_eq!(app.active_session_count(), 2);
        assert_eq!(app.session_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_past_sessions_come_from_history() {
        let mut snapshot = snapshot(1, 10.0);
        snapshot.session_history = vec![
            SessionRecord {
                id: 9,
                user_id: Some(1),
                machine_name: Some("PC-02".to_string()),
                is_active: false,
                duration: Some(2.0),
                ..Default::default()
            },
            SessionRecord {
                id: 10,
                user_id: Some(2),
                is_active: false,
                ..Default::default()
            },
        ];
        let mut app = test_app();
        app.apply_refresh_message(RefreshMessage::Completed(Box::new(snapshot)));

        let past = app.past_sessions();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].machine, "PC-02");
        assert_eq!(past[0].duration, "2.00 hours");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_data() {
        let mut app = loaded_app(2, 10.0);
        app.apply_refresh_message(RefreshMessage::Failed("connection refused".to_string()));

        assert_eq!(app.snapshot.as_ref().unwrap().active_sessions.len(), 2);
        assert_eq!(app.last_error.as_deref(), Some("connection refused"));
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, StatusType::Error);
        assert!(status.text.contains("connection refused"));
        assert!(!app.loading_states.data_refresh);
    }

    #[tokio::test]
    async fn test_selection_wraps_and_is_clamped_by_refresh() {
        let mut app = loaded_app(3, 10.0);
        app.current_tab = Tab::Sessions;

        app.handle_key_event(KeyCode::Char('k')).unwrap();
        assert_eq!(app.selected_session, 2);
        app.handle_key_event(KeyCode::Char('j')).unwrap();
        assert_eq!(app.selected_session, 0);
        app.handle_key_event(KeyCode::Up).unwrap();
        assert_eq!(app.selected_session, 2);

        app.apply_refresh_message(RefreshMessage::Completed(Box::new(snapshot(1, 10.0))));
        assert_eq!(app.selected_session, 0);
    }

    #[tokio::test]
    async fn test_end_session_needs_confirmation() {
        let mut app = loaded_app(2, 10.0);
        app.current_tab = Tab::Sessions;
        app.handle_key_event(KeyCode::Down).unwrap();

        app.handle_key_event(KeyCode::Char('e')).unwrap();
        match &app.pending_action {
            Some(PendingAction::EndSession { session_id, description }) => {
                assert_eq!(*session_id, 2);
                assert!(description.contains("user2"));
            }
            other => panic!("unexpected pending action: {other:?}"),
        }

        // Quitting is blocked while the popup is open
        app.handle_key_event(KeyCode::Char('q')).unwrap();
        assert!(!app.should_quit);

        app.handle_key_event(KeyCode::Esc).unwrap();
        assert!(app.pending_action.is_none());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_end_key_ignored_outside_sessions_tab() {
        let mut app = loaded_app(1, 10.0);
        app.handle_key_event(KeyCode::Char('e')).unwrap();
        assert!(app.pending_action.is_none());
    }

    #[tokio::test]
    async fn test_start_session_checks_balance_and_availability() {
        let mut app = loaded_app(0, 0.0);
        app.current_tab = Tab::Machines;

        app.handle_key_event(KeyCode::Char('s')).unwrap();
        assert!(app.pending_action.is_none());
        assert_eq!(
            app.status_message.as_ref().map(|status| status.message_type),
            Some(StatusType::Error)
        );

        let mut app = loaded_app(0, 20.0);
        app.current_tab = Tab::Machines;
        app.handle_key_event(KeyCode::Char('s')).unwrap();
        assert!(matches!(
            app.pending_action,
            Some(PendingAction::StartSession { ref request, .. }) if request.machine_id == 1
        ));

        app.pending_action = None;
        app.handle_key_event(KeyCode::Char('j')).unwrap();
        app.handle_key_event(KeyCode::Char('s')).unwrap();
        assert!(app.pending_action.is_none());
    }

    #[tokio::test]
    async fn test_confirmed_action_reports_backend_failure() {
        let mut app = loaded_app(1, 10.0);
        app.current_tab = Tab::Sessions;
        app.handle_key_event(KeyCode::Char('e')).unwrap();
        app.handle_key_event(KeyCode::Enter).unwrap();

        assert!(app.pending_action.is_none());
        assert!(app.loading_states.action_in_flight);

        let outcome = timeout(Duration::from_secs(5), app.action_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Failed(ref text) if text.contains("not signed in")));

        app.apply_action_outcome(outcome);
        assert!(!app.loading_states.action_in_flight);
        assert_eq!(
            app.status_message.as_ref().map(|status| status.message_type),
            Some(StatusType::Error)
        );
    }

    #[tokio::test]
    async fn test_refresh_interval_keys() {
        let mut app = test_app();
        app.handle_key_event(KeyCode::Char('4')).unwrap();
        assert_eq!(app.config.refresh_interval_secs, 60);

        app.handle_key_event(KeyCode::Char('1')).unwrap();
        assert_eq!(app.config.refresh_interval_secs, 10);
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let mut app = test_app();
        app.handle_key_event(KeyCode::Char('?')).unwrap();
        assert!(app.config.show_help);

        app.handle_key_event(KeyCode::Char('q')).unwrap();
        assert!(!app.should_quit);

        app.handle_key_event(KeyCode::Esc).unwrap();
        assert!(!app.config.show_help);

        app.handle_key_event(KeyCode::Char('q')).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_status_message_expires() {
        let mut app = test_app();
        app.show_status("hello", StatusType::Info);
        app.update_status_message();
        assert!(app.status_message.is_some());

        if let Some(status) = app.status_message.as_mut() {
            status.timestamp = Instant::now() - Duration::from_secs(3);
        }
        app.update_status_message();
        assert!(app.status_message.is_none());
    }
}
