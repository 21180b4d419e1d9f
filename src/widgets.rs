use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::billing::{TimeRemaining, Urgency};
use crate::shared::theme::{ModernIcons, ModernTheme, ProgressChars};

/// Write `text` grapheme by grapheme, stopping before `max_x`.
/// Returns the number of columns consumed.
fn render_text_unicode_aware(
    text: &str,
    buf: &mut Buffer,
    x: u16,
    y: u16,
    max_x: u16,
    style: Style,
) -> u16 {
    let mut current_x = x;

    for grapheme in text.graphemes(true) {
        let width = grapheme.width() as u16;
        if current_x + width > max_x {
            break;
        }

        let cell = buf.get_mut(current_x, y);
        cell.set_symbol(grapheme);
        cell.set_style(style);

        current_x += width;

        // zero-width graphemes still occupy a cell
        if width == 0 && current_x == x {
            current_x += 1;
        }
    }

    current_x - x
}

/// Bordered card holding wrapped text
pub struct ModernCard<'a> {
    title: Option<&'a str>,
    content: Text<'a>,
    theme: &'a ModernTheme,
    focused: bool,
}

impl<'a> ModernCard<'a> {
    pub fn new(content: Text<'a>, theme: &'a ModernTheme) -> Self {
        Self {
            title: None,
            content,
            theme,
            focused: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl<'a> Widget for ModernCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = modern_block(self.title, self.theme, self.focused);
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.content)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[derive(Clone, Copy)]
pub enum ProgressVariant {
    Info,
    /// Colour follows the fill level
    Auto,
    /// Colour follows a remaining-time urgency
    Urgency(Urgency),
}

/// Single-row progress bar with a centered label
pub struct ModernProgressBar<'a> {
    percentage: f64,
    label: Option<&'a str>,
    theme: &'a ModernTheme,
    show_percentage: bool,
    variant: ProgressVariant,
}

impl<'a> ModernProgressBar<'a> {
    pub fn new(percentage: f64, theme: &'a ModernTheme) -> Self {
        Self {
            percentage: if percentage.is_finite() {
                percentage.clamp(0.0, 100.0)
            } else {
                0.0
            },
            label: None,
            theme,
            show_percentage: true,
            variant: ProgressVariant::Auto,
        }
    }

    /// Bar for a session countdown: fill is the share of a full session left
    pub fn for_remaining(remaining: &TimeRemaining, theme: &'a ModernTheme) -> Self {
        Self::new(remaining.percentage, theme)
            .variant(ProgressVariant::Urgency(remaining.status))
            .show_percentage(false)
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn show_percentage(mut self, show: bool) -> Self {
        self.show_percentage = show;
        self
    }

    pub fn variant(mut self, variant: ProgressVariant) -> Self {
        self.variant = variant;
        self
    }

    fn overlay_text(&self) -> String {
        match (self.label, self.show_percentage) {
            (Some(label), true) => format!("{} {:.1}%", label, self.percentage),
            (Some(label), false) => label.to_string(),
            (None, true) => format!("{:.1}%", self.percentage),
            (None, false) => String::new(),
        }
    }
}

impl<'a> Widget for ModernProgressBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let progress_style = match self.variant {
            ProgressVariant::Info => self.theme.info_style(),
            ProgressVariant::Auto => self.theme.progress_style_for_percentage(self.percentage),
            ProgressVariant::Urgency(urgency) => self.theme.urgency_style(urgency),
        };

        let progress_width = area.width as f64 * (self.percentage / 100.0);
        let filled_chars = progress_width.floor() as u16;
        let remaining_width = progress_width - filled_chars as f64;

        for x in 0..area.width {
            let cell = buf.get_mut(area.x + x, area.y);

            if x < filled_chars {
                cell.set_char(ProgressChars::FILLED);
                cell.set_style(progress_style);
            } else if x == filled_chars && remaining_width > 0.5 {
                cell.set_char(ProgressChars::PARTIAL);
                cell.set_style(progress_style);
            } else {
                cell.set_char(ProgressChars::EMPTY);
                cell.set_style(self.theme.dimmed_style());
            }
        }

        let overlay_text = self.overlay_text();
        if overlay_text.is_empty() || area.width <= 10 {
            return;
        }

        let text_width = overlay_text.width();
        if text_width <= area.width as usize {
            let x_offset = (area.width as usize - text_width) / 2;
            render_text_unicode_aware(
                &overlay_text,
                buf,
                area.x + x_offset as u16,
                area.y,
                area.x + area.width,
                Style::default().fg(self.theme.text_primary),
            );
        }
    }
}

/// Bordered list with an optional highlighted row.
///
/// Rows past the visible height scroll so the selection stays in view.
pub struct ModernList<'a> {
    items: Vec<ModernListItem<'a>>,
    selected: Option<usize>,
    theme: &'a ModernTheme,
    title: Option<&'a str>,
    focused: bool,
}

pub struct ModernListItem<'a> {
    text: Line<'a>,
    icon: Option<&'a str>,
    style: Option<Style>,
}

impl<'a> ModernListItem<'a> {
    pub fn new<T: Into<Line<'a>>>(text: T) -> Self {
        Self {
            text: text.into(),
            icon: None,
            style: None,
        }
    }

    pub fn icon(mut self, icon: &'a str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl<'a> ModernList<'a> {
    pub fn new(items: Vec<ModernListItem<'a>>, theme: &'a ModernTheme) -> Self {
        Self {
            items,
            selected: None,
            theme,
            title: None,
            focused: false,
        }
    }

    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// First row to draw so that `selected` is visible in `height` rows
pub fn scroll_offset(selected: Option<usize>, height: usize) -> usize {
    match selected {
        Some(index) if height > 0 && index >= height => index + 1 - height,
        _ => 0,
    }
}

impl<'a> Widget for ModernList<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = modern_block(self.title, self.theme, self.focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let max_x = inner.x + inner.width;
        let offset = scroll_offset(self.selected, inner.height as usize);

        for (row, (i, item)) in self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(inner.height as usize)
            .enumerate()
        {
            let y = inner.y + row as u16;
            let mut x = inner.x;
            let is_selected = Some(i) == self.selected;

            let item_style = if is_selected {
                self.theme.selected_style()
            } else {
                item.style
                    .unwrap_or_else(|| self.theme.secondary_text_style())
            };

            if is_selected {
                for bg_x in inner.x..max_x {
                    buf.get_mut(bg_x, y).set_style(item_style);
                }
            }

            if let Some(icon) = item.icon {
                x += render_text_unicode_aware(icon, buf, x, y, max_x, item_style);
                if x < max_x {
                    buf.get_mut(x, y).set_char(' ');
                    x += 1;
                }
            }

            for span in &item.text.spans {
                let style = if is_selected {
                    span.style.patch(item_style)
                } else {
                    item_style.patch(span.style)
                };
                x += render_text_unicode_aware(&span.content, buf, x, y, max_x, style);
            }
        }
    }
}

/// Labelled ratio bar
pub struct ModernGauge<'a> {
    ratio: f64,
    label: Option<&'a str>,
    theme: &'a ModernTheme,
    variant: ProgressVariant,
}

impl<'a> ModernGauge<'a> {
    pub fn new(ratio: f64, theme: &'a ModernTheme) -> Self {
        Self {
            ratio: if ratio.is_finite() {
                ratio.clamp(0.0, 1.0)
            } else {
                0.0
            },
            label: None,
            theme,
            variant: ProgressVariant::Auto,
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn variant(mut self, variant: ProgressVariant) -> Self {
        self.variant = variant;
        self
    }
}

impl<'a> Widget for ModernGauge<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let progress_bar =
            ModernProgressBar::new(self.ratio * 100.0, self.theme).variant(self.variant);

        match self.label {
            Some(label) => progress_bar.label(label).render(area, buf),
            None => progress_bar.render(area, buf),
        }
    }
}

pub fn modern_block<'a>(title: Option<&'a str>, theme: &'a ModernTheme, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused_style()
        } else {
            theme.border_style()
        });

    if let Some(title) = title {
        block = block.title(title);
    }

    block
}

pub fn icon_span<'a>(icon: &'a str, style: Style) -> Span<'a> {
    Span::styled(icon, style)
}

/// Span for numbers and money
pub fn metric_span<'a>(text: String, theme: &'a ModernTheme) -> Span<'a> {
    Span::styled(text, theme.metric_style())
}

pub fn status_icon(active: bool) -> &'static str {
    if active {
        ModernIcons::ACTIVE
    } else {
        ModernIcons::INACTIVE
    }
}

pub fn urgency_icon(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Normal => ModernIcons::NORMAL,
        Urgency::Warning => ModernIcons::WARNING,
        Urgency::Critical => ModernIcons::CRITICAL,
        Urgency::Expired => ModernIcons::EXPIRED,
    }
}

/// Truncate `text` to `max_width` columns, ending in `...` when cut
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let target_width = max_width.saturating_sub(ellipsis.width());
    let mut result = String::new();
    let mut current_width = 0;

    for grapheme in text.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > target_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }

    result.push_str(ellipsis);
    result
}

/// Fixed-width table cell: truncated, then right padded with spaces
pub fn column(text: &str, width: usize) -> String {
    let mut cell = truncate_to_width(text, width);
    let padding = width.saturating_sub(cell.width());
    cell.extend(std::iter::repeat(' ').take(padding));
    cell
}
