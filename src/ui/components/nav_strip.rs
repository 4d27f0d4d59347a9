use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Per-question overview: one cell per question showing answered,
/// flagged, and current markers.
pub struct NavStrip<'a> {
    pub current_index: usize,
    pub answers: &'a [Option<usize>],
    pub flagged: &'a [bool],
    pub theme: &'a Theme,
}

impl Widget for &NavStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let answered = self.answers.iter().filter(|a| a.is_some()).count();
        let title = format!(" Overview · {answered}/{} answered ", self.answers.len());

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default().fg(colors.accent()),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans: Vec<Span> = Vec::new();
        for (i, answer) in self.answers.iter().enumerate() {
            let is_current = i == self.current_index;
            let is_flagged = self.flagged.get(i).copied().unwrap_or(false);

            let symbol = if is_flagged {
                format!("{:>2}⚑", i + 1)
            } else {
                format!("{:>2} ", i + 1)
            };

            let mut style = if answer.is_some() {
                Style::default().fg(colors.success())
            } else {
                Style::default().fg(colors.dim())
            };
            if is_flagged {
                style = style.fg(colors.warning());
            }
            if is_current {
                style = style
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD);
            }

            spans.push(Span::styled(symbol, style));
            spans.push(Span::raw(" "));
        }

        let strip = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false });
        strip.render(inner, buf);
    }
}
