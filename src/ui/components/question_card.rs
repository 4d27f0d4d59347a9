use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::Question;
use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    pub question: &'a Question,
    pub index: usize,
    pub total: usize,
    pub selected_option: Option<usize>,
    pub flagged: bool,
    pub theme: &'a Theme,
}

impl Widget for &QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let flag_marker = if self.flagged { " ⚑" } else { "" };
        let title = format!(
            " Question {} of {} · {}{} ",
            self.index + 1,
            self.total,
            self.question.category.label(),
            flag_marker,
        );

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default().fg(if self.flagged {
                    colors.warning()
                } else {
                    colors.accent()
                }),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();

        let difficulty_dots: String = (1..=5)
            .map(|d| if d <= self.question.difficulty { '●' } else { '○' })
            .collect();
        lines.push(Line::from(Span::styled(
            format!("difficulty {difficulty_dots}"),
            Style::default().fg(colors.dim()),
        )));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            self.question.prompt.clone(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        if let Some(grid) = &self.question.grid {
            for row in grid {
                let cells = row
                    .iter()
                    .map(|c| format!("{c:^5}"))
                    .collect::<Vec<_>>()
                    .join("│");
                lines.push(Line::from(Span::styled(
                    format!("  {cells}"),
                    Style::default().fg(colors.accent()),
                )));
            }
            lines.push(Line::from(""));
        }

        if let Some(sequence) = &self.question.sequence {
            let seq = sequence.join("  →  ");
            lines.push(Line::from(Span::styled(
                format!("  {seq}"),
                Style::default().fg(colors.accent()),
            )));
            lines.push(Line::from(""));
        }

        for (i, option) in self.question.options.iter().enumerate() {
            let is_chosen = self.selected_option == Some(i);
            let marker = if is_chosen { "●" } else { "○" };
            let style = if is_chosen {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(" {marker} [{}] {option}", i + 1),
                style,
            )));
        }

        let card = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        card.render(inner, buf);
    }
}
