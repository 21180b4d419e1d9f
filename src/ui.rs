use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Clear, Tabs, Widget},
    Frame,
};

use crate::{
    app::{App, StatusType, Tab},
    billing::format_cost,
    features::{
        dashboard::{MachineUtilization, RecentTiming},
        machines::{affordability_display, StatusCounts},
        sessions::urgency_counts,
    },
    shared::theme::{ModernIcons, ModernTheme},
    widgets::{
        column, icon_span, metric_span, modern_block, status_icon, urgency_icon, ModernCard,
        ModernGauge, ModernList, ModernListItem, ModernProgressBar, ProgressVariant,
    },
};

/// Draw the main UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = app.current_theme().clone();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Tab content
            Constraint::Length(4), // Footer
        ])
        .split(f.size());

    draw_modern_header(f, chunks[0], app, &theme);
    draw_modern_tab_bar(f, chunks[1], app, &theme);
    draw_modern_tab_content(f, chunks[2], app, &theme);
    draw_modern_footer(f, chunks[3], app, &theme);

    if app.config.show_help {
        draw_help_overlay(f, f.size(), app, &theme);
    }

    if app.pending_action.is_some() {
        draw_confirm_overlay(f, f.size(), app, &theme);
    }
}

fn draw_modern_header(f: &mut Frame, area: Rect, app: &mut App, theme: &ModernTheme) {
    let mut header_spans = vec![
        icon_span(ModernIcons::REFRESH, Style::default().fg(theme.accent)),
        Span::styled(format!(" {}", app.i18n.t("app.title")), theme.header_style()),
    ];

    if let Some(viewer) = app.viewer() {
        header_spans.extend_from_slice(&[
            Span::styled(" │ ", theme.border_style()),
            Span::styled(viewer.username.clone(), theme.info_style()),
            Span::styled(
                format!(" ({})", viewer.role_display()),
                theme.secondary_text_style(),
            ),
        ]);
        if let Some(balance) = viewer.balance {
            header_spans.extend_from_slice(&[
                Span::styled(" │ ", theme.border_style()),
                Span::styled(ModernIcons::MONEY, Style::default().fg(theme.success)),
                metric_span(format_cost(balance), theme),
            ]);
        }
    }

    let active = app.active_session_count();
    header_spans.extend_from_slice(&[
        Span::styled(" │ ", theme.border_style()),
        icon_span(ModernIcons::SESSIONS, Style::default().fg(theme.warning)),
        metric_span(format!(" {active}"), theme),
        Span::styled(" active", theme.secondary_text_style()),
        Span::styled(" │ ", theme.border_style()),
        icon_span(ModernIcons::TIME, Style::default().fg(theme.info)),
        Span::styled(
            format!(" {}", app.now.with_timezone(&chrono::Local).format("%H:%M:%S")),
            theme.secondary_text_style(),
        ),
    ]);

    if app.loading_states.is_loading() {
        let spinner_char = app.loading_states.get_spinner_char();
        header_spans.push(Span::styled(" ", theme.border_style()));
        header_spans.push(Span::styled(format!("{spinner_char}"), theme.warning_style()));
    }

    if let Some(ref status) = app.status_message {
        let (icon, style) = match status.message_type {
            StatusType::Info => ("ℹ", theme.info_style()),
            StatusType::Success => ("✓", theme.success_style()),
            StatusType::Warning => ("⚠", theme.warning_style()),
            StatusType::Error => ("✗", theme.danger_style()),
        };

        header_spans.push(Span::styled(" │ ", theme.border_style()));
        header_spans.push(Span::styled(format!(" {} {}", icon, status.text), style));
    }

    let host = app.backend_url().to_string();
    ModernCard::new(Text::from(Line::from(header_spans)), theme)
        .title(&host)
        .render(area, f.buffer_mut());
}

fn draw_modern_tab_bar(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let tab_titles = vec![
        format!("{} {}", ModernIcons::DASHBOARD, app.i18n.t(Tab::Dashboard.title_key())),
        format!("{} {}", ModernIcons::SESSIONS, app.i18n.t(Tab::Sessions.title_key())),
        format!("{} {}", ModernIcons::PROFILE, app.i18n.t(Tab::Profile.title_key())),
        format!("{} {}", ModernIcons::MACHINES, app.i18n.t(Tab::Machines.title_key())),
    ];

    let tabs = Tabs::new(tab_titles)
        .block(modern_block(None, theme, false))
        .style(theme.secondary_text_style())
        .highlight_style(theme.selected_style())
        .select(app.current_tab as usize);

    f.render_widget(tabs, area);
}

fn draw_modern_tab_content(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    if app.snapshot.is_none() {
        draw_waiting_card(f, area, app, theme);
        return;
    }

    match app.current_tab {
        Tab::Dashboard => draw_dashboard_tab(f, area, app, theme),
        Tab::Sessions => draw_sessions_tab(f, area, app, theme),
        Tab::Profile => draw_profile_tab(f, area, app, theme),
        Tab::Machines => draw_machines_tab(f, area, app, theme),
    }
}

/// Placeholder until the first fetch lands
fn draw_waiting_card(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let mut lines = vec![Line::from(Span::styled(
        app.i18n.t("status.no_data"),
        theme.secondary_text_style(),
    ))];

    if let Some(ref error) = app.last_error {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(app.i18n.t("status.last_error"), theme.danger_style()),
            Span::styled(format!(" {error}"), theme.secondary_text_style()),
        ]));
    }

    ModernCard::new(Text::from(lines), theme)
        .title(app.i18n.t("status.loading"))
        .render(area, f.buffer_mut());
}

fn draw_dashboard_tab(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stat tiles
            Constraint::Length(5), // Utilization
            Constraint::Min(0),    // Recent sessions
        ])
        .split(area);

    let tiles = app.stat_tiles();
    if !tiles.is_empty() {
        let constraints: Vec<Constraint> = tiles
            .iter()
            .map(|_| Constraint::Ratio(1, tiles.len() as u32))
            .collect();
        let tile_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(chunks[0]);

        for (tile, tile_area) in tiles.iter().zip(tile_areas.iter()) {
            let content = Text::from(Line::from(metric_span(tile.value.clone(), theme)));
            ModernCard::new(content, theme)
                .title(tile.label)
                .render(*tile_area, f.buffer_mut());
        }
    } else {
        ModernCard::new(
            Text::from(Span::styled("-", theme.dimmed_style())),
            theme,
        )
        .title(app.i18n.t("dashboard.stats"))
        .render(chunks[0], f.buffer_mut());
    }

    draw_utilization_card(f, chunks[1], app, theme);
    draw_recent_sessions(f, chunks[2], app, theme);
}

fn draw_utilization_card(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let block = modern_block(Some(app.i18n.t("dashboard.utilization")), theme, false);
    let inner = block.inner(area);
    block.render(area, f.buffer_mut());

    let Some(stats) = app.snapshot.as_ref().and_then(|snapshot| snapshot.stats.as_ref()) else {
        return;
    };
    let utilization = MachineUtilization::from(&stats.machine_stats);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(inner);

    let gauges = [
        (
            format!("{} {}/{}", app.i18n.t("dashboard.in_use"), utilization.in_use, utilization.total),
            utilization.in_use_percentage(),
            ProgressVariant::Auto,
        ),
        (
            format!(
                "{} {}/{}",
                app.i18n.t("dashboard.available"),
                utilization.available,
                utilization.total
            ),
            utilization.share(utilization.available),
            ProgressVariant::Info,
        ),
        (
            format!(
                "{} {}/{}",
                app.i18n.t("dashboard.maintenance"),
                utilization.maintenance,
                utilization.total
            ),
            utilization.share(utilization.maintenance),
            ProgressVariant::Info,
        ),
    ];

    for ((label, percentage, variant), row) in gauges.iter().zip(rows.iter()) {
        ModernGauge::new(percentage / 100.0, theme)
            .label(label)
            .variant(*variant)
            .render(*row, f.buffer_mut());
    }
}

fn draw_recent_sessions(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let rows = app.recent_rows();
    if rows.is_empty() {
        ModernCard::new(
            Text::from(Span::styled(
                app.i18n.t("dashboard.no_recent"),
                theme.secondary_text_style(),
            )),
            theme,
        )
        .title(app.i18n.t("dashboard.recent"))
        .render(area, f.buffer_mut());
        return;
    }

    let items = rows
        .iter()
        .map(|row| {
            let (icon, style) = match &row.timing {
                RecentTiming::Running(remaining) => (
                    urgency_icon(remaining.status),
                    theme.urgency_style(remaining.status),
                ),
                RecentTiming::Ended(_) => (status_icon(false), theme.dimmed_style()),
            };
            ModernListItem::new(Line::from(vec![
                Span::raw(column(&row.user, 12)),
                Span::raw(" "),
                Span::raw(column(&row.machine, 16)),
                Span::raw(" "),
                Span::raw(column(&row.started, 17)),
                Span::raw(" "),
                Span::styled(row.timing.display(), style),
            ]))
            .icon(icon)
            .style(theme.secondary_text_style())
        })
        .collect();

    ModernList::new(items, theme)
        .title(app.i18n.t("dashboard.recent"))
        .render(area, f.buffer_mut());
}

fn draw_sessions_tab(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let rows = app.session_rows();
    let counts = urgency_counts(&rows);

    let summary = Line::from(vec![
        icon_span(ModernIcons::SESSIONS, Style::default().fg(theme.accent)),
        metric_span(format!(" {}", rows.len()), theme),
        Span::styled(" active │ ", theme.secondary_text_style()),
        icon_span(ModernIcons::WARNING, theme.warning_style()),
        Span::styled(format!(" {}", counts.warning), theme.warning_style()),
        Span::raw("  "),
        icon_span(ModernIcons::CRITICAL, theme.danger_style()),
        Span::styled(format!(" {}", counts.critical + counts.expired), theme.danger_style()),
        Span::styled(
            format!(" │ {} {}", counts.attention(), app.i18n.t("sessions.attention")),
            theme.secondary_text_style(),
        ),
    ]);
    ModernCard::new(Text::from(summary), theme)
        .title(app.i18n.t("sessions.active"))
        .render(chunks[0], f.buffer_mut());

    let mut items = vec![ModernListItem::new(Span::styled(
        app.i18n.t("sessions.header"),
        theme.header_style(),
    ))
    .icon(" ")];

    if rows.is_empty() {
        items.push(
            ModernListItem::new(app.i18n.t("sessions.no_sessions")).style(theme.dimmed_style()),
        );
    }

    for row in &rows {
        let urgency_style = theme.urgency_style(row.remaining.status);
        items.push(
            ModernListItem::new(Line::from(vec![
                Span::styled(column(&row.id.to_string(), 4), theme.dimmed_style()),
                Span::raw(" "),
                Span::raw(column(&row.user, 12)),
                Span::raw(" "),
                Span::raw(column(&row.machine_display(), 20)),
                Span::raw(" "),
                Span::raw(column(&row.started, 17)),
                Span::raw(" "),
                Span::styled(column(&row.remaining.formatted, 10), urgency_style),
                Span::raw(" "),
                Span::styled(row.cost_display(), theme.metric_style()),
            ]))
            .icon(urgency_icon(row.remaining.status))
            .style(theme.secondary_text_style()),
        );
    }

    let selected = (!rows.is_empty()).then_some(app.selected_session + 1);
    ModernList::new(items, theme)
        .selected(selected)
        .focused(true)
        .render(chunks[1], f.buffer_mut());
}

fn draw_profile_tab(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let Some(viewer) = app.viewer() else {
        ModernCard::new(
            Text::from(Span::styled(
                app.i18n.t("profile.signed_out"),
                theme.warning_style(),
            )),
            theme,
        )
        .title(app.i18n.t("profile.account"))
        .render(area, f.buffer_mut());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    let balance = viewer
        .balance
        .map(|balance| format!("${}", format_cost(balance)))
        .unwrap_or_else(|| "-".to_string());
    let account = Text::from(vec![
        Line::from(vec![
            Span::styled(app.i18n.t("profile.username"), theme.secondary_text_style()),
            Span::styled(format!(" {}", viewer.username), theme.header_style()),
        ]),
        Line::from(vec![
            Span::styled(app.i18n.t("profile.email"), theme.secondary_text_style()),
            Span::styled(
                format!(" {}", viewer.email.as_deref().unwrap_or("-")),
                theme.secondary_text_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(app.i18n.t("profile.role"), theme.secondary_text_style()),
            Span::styled(format!(" {}", viewer.role_display()), theme.info_style()),
        ]),
        Line::from(vec![
            Span::styled(app.i18n.t("profile.balance"), theme.secondary_text_style()),
            Span::styled(
                format!(" {balance}"),
                theme.amount_style(viewer.balance.unwrap_or(0.0)),
            ),
        ]),
    ]);
    ModernCard::new(account, theme)
        .title(app.i18n.t("profile.account"))
        .render(top[0], f.buffer_mut());

    draw_current_session_card(f, top[1], app, theme);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    draw_transactions(f, bottom[0], app, theme);
    draw_session_history(f, bottom[1], app, theme);
}

fn draw_current_session_card(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let title = app.i18n.t("profile.current_session");
    let sessions = app.own_sessions();
    let Some(session) = sessions.first() else {
        ModernCard::new(
            Text::from(Span::styled(
                app.i18n.t("profile.no_session"),
                theme.secondary_text_style(),
            )),
            theme,
        )
        .title(title)
        .render(area, f.buffer_mut());
        return;
    };

    let remaining = &session.remaining;
    let cost = session
        .estimated_cost
        .map(|cost| format!("${}", format_cost(cost)))
        .unwrap_or_else(|| "-".to_string());
    let machine = if session.machine_type.is_empty() {
        session.machine.clone()
    } else {
        format!("{} ({})", session.machine, session.machine_type)
    };

    let content = Text::from(vec![
        Line::from(vec![
            icon_span(ModernIcons::MACHINES, Style::default().fg(theme.accent)),
            Span::styled(format!(" {machine}"), theme.header_style()),
            Span::styled(format!("  {}", session.started), theme.secondary_text_style()),
        ]),
        Line::from(vec![
            Span::styled(app.i18n.t("profile.time_left"), theme.secondary_text_style()),
            Span::styled(
                format!(" {}", remaining.formatted),
                theme.urgency_style(remaining.status).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({})", remaining.status),
                theme.urgency_style(remaining.status),
            ),
        ]),
        Line::from(vec![
            Span::styled(app.i18n.t("profile.cost"), theme.secondary_text_style()),
            metric_span(format!(" {cost}"), theme),
        ]),
    ]);

    ModernCard::new(content, theme)
        .title(title)
        .focused(remaining.status != crate::billing::Urgency::Normal)
        .render(area, f.buffer_mut());

    // Countdown bar on the last inner row
    if area.height >= 6 && area.width > 4 {
        let bar_area = Rect {
            x: area.x + 1,
            y: area.y + area.height - 2,
            width: area.width - 2,
            height: 1,
        };
        ModernProgressBar::for_remaining(remaining, theme).render(bar_area, f.buffer_mut());
    }
}

fn draw_transactions(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let rows = app.transaction_rows();
    let title = app.i18n.t("profile.transactions");

    if rows.is_empty() {
        ModernCard::new(
            Text::from(Span::styled(
                app.i18n.t("profile.no_transactions"),
                theme.secondary_text_style(),
            )),
            theme,
        )
        .title(title)
        .render(area, f.buffer_mut());
        return;
    }

    let items = rows
        .iter()
        .map(|row| {
            ModernListItem::new(Line::from(vec![
                Span::raw(column(&row.date, 17)),
                Span::raw(" "),
                Span::raw(column(row.kind, 8)),
                Span::raw(" "),
                Span::styled(column(&row.amount_display, 10), theme.amount_style(row.amount)),
                Span::raw(" "),
                Span::raw(row.description.clone()),
            ]))
            .icon(ModernIcons::BULLET)
            .style(theme.secondary_text_style())
        })
        .collect();

    ModernList::new(items, theme)
        .title(title)
        .render(area, f.buffer_mut());
}

fn draw_session_history(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let past = app.past_sessions();
    let title = app.i18n.t("profile.history");

    if past.is_empty() {
        ModernCard::new(
            Text::from(Span::styled(
                app.i18n.t("profile.no_history"),
                theme.secondary_text_style(),
            )),
            theme,
        )
        .title(title)
        .render(area, f.buffer_mut());
        return;
    }

    let items = past
        .iter()
        .map(|session| {
            ModernListItem::new(Line::from(vec![
                Span::raw(column(&session.machine, 8)),
                Span::raw(" "),
                Span::raw(column(&session.started, 17)),
                Span::raw(" "),
                Span::styled(session.duration.clone(), theme.info_style()),
            ]))
            .icon(ModernIcons::BULLET)
            .style(theme.secondary_text_style())
        })
        .collect();

    ModernList::new(items, theme)
        .title(title)
        .render(area, f.buffer_mut());
}

fn draw_machines_tab(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let rows = app.machine_rows();
    let counts = StatusCounts::from_rows(&rows);

    let mut summary = vec![
        Span::styled(
            format!("{} {}", status_icon(true), counts.available),
            theme.success_style(),
        ),
        Span::styled(" available │ ", theme.secondary_text_style()),
        Span::styled(
            format!("{} {}", status_icon(true), counts.in_use),
            theme.warning_style(),
        ),
        Span::styled(" in use │ ", theme.secondary_text_style()),
        Span::styled(
            format!("{} {}", status_icon(false), counts.maintenance),
            theme.danger_style(),
        ),
        Span::styled(" maintenance", theme.secondary_text_style()),
    ];
    if counts.other > 0 {
        summary.push(Span::styled(
            format!(" │ {} other", counts.other),
            theme.dimmed_style(),
        ));
    }
    ModernCard::new(Text::from(Line::from(summary)), theme)
        .title(app.i18n.t("machines.list"))
        .render(chunks[0], f.buffer_mut());

    let mut items = vec![ModernListItem::new(Span::styled(
        app.i18n.t("machines.header"),
        theme.header_style(),
    ))
    .icon(" ")];

    if rows.is_empty() {
        items.push(
            ModernListItem::new(app.i18n.t("machines.no_machines")).style(theme.dimmed_style()),
        );
    }

    for row in &rows {
        let status_style = theme.machine_status_style(&row.status);
        items.push(
            ModernListItem::new(Line::from(vec![
                Span::raw(column(&row.name, 16)),
                Span::raw(" "),
                Span::raw(column(&row.machine_type, 10)),
                Span::raw(" "),
                Span::styled(column(&row.rate_display(), 9), theme.metric_style()),
                Span::raw(" "),
                Span::styled(column(&row.status.to_string(), 13), status_style),
                Span::raw(" "),
                Span::raw(affordability_display(row.affordable_hours)),
            ]))
            .icon(status_icon(row.is_available()))
            .style(theme.secondary_text_style()),
        );
    }

    let selected = (!rows.is_empty()).then_some(app.selected_machine + 1);
    ModernList::new(items, theme)
        .selected(selected)
        .focused(true)
        .render(chunks[1], f.buffer_mut());
}

fn key_span<'a>(key: &'a str, theme: &ModernTheme) -> Span<'a> {
    Span::styled(key, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

fn draw_modern_footer(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Controls
            Constraint::Length(25), // Refresh info
        ])
        .split(area);

    let mut first_line = vec![
        Span::styled(app.i18n.t("controls.navigation"), theme.secondary_text_style()),
        key_span(" j/k ↑↓", theme),
        Span::styled(" | ", theme.secondary_text_style()),
        Span::styled(app.i18n.t("controls.theme"), theme.secondary_text_style()),
        key_span(" t", theme),
        Span::styled(format!(" ({})", app.config.theme_display()), theme.info_style()),
    ];
    match app.current_tab {
        Tab::Sessions => first_line.extend_from_slice(&[
            Span::styled(" | ", theme.secondary_text_style()),
            Span::styled("e", theme.warning_style().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" {}", app.i18n.t("controls.end")),
                theme.secondary_text_style(),
            ),
        ]),
        Tab::Machines => first_line.extend_from_slice(&[
            Span::styled(" | ", theme.secondary_text_style()),
            Span::styled("s", theme.success_style().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" {}", app.i18n.t("controls.start")),
                theme.secondary_text_style(),
            ),
        ]),
        Tab::Dashboard | Tab::Profile => {}
    }

    let help_content = Text::from(vec![
        Line::from(first_line),
        Line::from(vec![
            Span::styled(app.i18n.t("controls.tabs"), theme.secondary_text_style()),
            key_span(" Tab/Shift+Tab", theme),
            Span::styled(" | ", theme.secondary_text_style()),
            Span::styled(app.i18n.t("controls.refresh"), theme.secondary_text_style()),
            key_span(" 1-5", theme),
            Span::styled(" | ", theme.secondary_text_style()),
            key_span("r", theme),
            Span::styled(
                format!(" {} | ", app.i18n.t("controls.manual")),
                theme.secondary_text_style(),
            ),
            Span::styled(app.i18n.t("controls.help"), theme.secondary_text_style()),
            key_span(" ?", theme),
            Span::styled(" | ", theme.secondary_text_style()),
            Span::styled("q", theme.danger_style().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" {}", app.i18n.t("controls.quit")),
                theme.secondary_text_style(),
            ),
        ]),
    ]);

    ModernCard::new(help_content, theme)
        .title("Controls")
        .render(chunks[0], f.buffer_mut());

    let mut interval_line = vec![
        icon_span(ModernIcons::REFRESH, Style::default().fg(theme.info)),
        Span::styled(
            format!(" {}", app.config.refresh_interval_display()),
            Style::default().fg(theme.accent),
        ),
    ];
    if let Some(ref snapshot) = app.snapshot {
        interval_line.push(Span::styled(
            format!(
                " @ {}",
                snapshot.fetched_at.with_timezone(&chrono::Local).format("%H:%M:%S")
            ),
            theme.secondary_text_style(),
        ));
    }

    let refresh_content = Text::from(vec![
        Line::from(interval_line),
        Line::from(vec![
            Span::styled("Next: ", theme.secondary_text_style()),
            metric_span(format!("{}s", app.next_refresh_in.as_secs()), theme),
        ]),
    ]);

    ModernCard::new(refresh_content, theme)
        .title("Auto Refresh")
        .render(chunks[1], f.buffer_mut());
}

fn draw_help_overlay(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let popup_area = Rect {
        x: area.width / 6,
        y: area.height / 6,
        width: area.width * 2 / 3,
        height: area.height * 2 / 3,
    };

    f.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for key in [
        "help.dashboard",
        "help.sessions",
        "help.profile",
        "help.machines",
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", ModernIcons::BULLET), theme.info_style()),
            Span::styled(app.i18n.t(key), theme.secondary_text_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.i18n.t("help.countdown"),
        theme.secondary_text_style(),
    )));
    lines.push(Line::from(vec![
        icon_span(ModernIcons::NORMAL, theme.success_style()),
        Span::raw(" "),
        icon_span(ModernIcons::WARNING, theme.warning_style()),
        Span::raw(" "),
        icon_span(ModernIcons::CRITICAL, theme.danger_style()),
        Span::raw(" "),
        Span::styled(app.i18n.t("help.urgency"), theme.secondary_text_style()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        app.i18n.t("help.close"),
        theme.info_style().add_modifier(Modifier::BOLD),
    )));

    let title = format!("{} {}", ModernIcons::HELP, app.i18n.t("help.title"));
    ModernCard::new(Text::from(lines), theme)
        .title(&title)
        .focused(true)
        .render(popup_area, f.buffer_mut());
}

fn draw_confirm_overlay(f: &mut Frame, area: Rect, app: &App, theme: &ModernTheme) {
    let Some(ref action) = app.pending_action else {
        return;
    };

    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height.saturating_sub(4));
    let popup_area = Rect {
        x: (area.width - popup_width) / 2,
        y: (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    f.render_widget(Clear, popup_area);

    let content = Text::from(vec![
        Line::from(Span::styled(app.i18n.t(action.prompt_key()), theme.header_style())),
        Line::from(vec![
            Span::styled(format!("{} ", ModernIcons::ARROW_RIGHT), theme.info_style()),
            Span::styled(action.description().to_string(), theme.secondary_text_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", theme.info_style().add_modifier(Modifier::BOLD)),
            Span::styled(" / ", theme.secondary_text_style()),
            Span::styled("Esc", theme.danger_style().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", app.i18n.t("confirm.hint")),
                theme.secondary_text_style(),
            ),
        ]),
    ]);

    ModernCard::new(content, theme)
        .title(app.i18n.t("confirm.title"))
        .focused(true)
        .render(popup_area, f.buffer_mut());
}
