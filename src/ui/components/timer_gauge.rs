use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Gauge, Widget};

use crate::ui::theme::Theme;

pub struct TimerGauge<'a> {
    pub remaining_ms: i64,
    pub budget_ms: i64,
    pub warning_secs: u64,
    pub mode_label: &'a str,
    pub theme: &'a Theme,
}

pub fn format_clock(ms: i64) -> String {
    let total_secs = (ms.max(0) + 999) / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

impl Widget for &TimerGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let in_warning = self.remaining_ms <= self.warning_secs as i64 * 1000;
        let bar_color = if in_warning {
            colors.warning()
        } else {
            colors.accent()
        };

        let ratio = if self.budget_ms > 0 {
            (self.remaining_ms.max(0) as f64 / self.budget_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let label = format!("{} · {}", self.mode_label, format_clock(self.remaining_ms));

        let gauge = Gauge::default()
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(colors.border()))
                    .style(Style::default().bg(colors.bg())),
            )
            .gauge_style(Style::default().fg(bar_color).bg(colors.accent_dim()))
            .label(Span::styled(
                label,
                Style::default()
                    .fg(colors.header_fg())
                    .add_modifier(Modifier::BOLD),
            ))
            .ratio(ratio);
        gauge.render(area, buf);
    }
}
