use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::scoring::{PracticeReport, ScoreReport};
use crate::ui::theme::Theme;

fn format_duration(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{}s", secs, (ms.max(0) % 1000) / 100)
    }
}

fn bar(percentage: u32, width: usize) -> String {
    let filled = (percentage as usize * width) / 100;
    let mut out = String::with_capacity(width);
    for i in 0..width {
        out.push(if i < filled { '█' } else { '░' });
    }
    out
}

pub struct ResultsPanel<'a> {
    pub report: &'a ScoreReport,
    pub permalink: &'a str,
    pub theme: &'a Theme,
}

impl Widget for &ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                " Assessment Results ",
                Style::default().fg(colors.accent()),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::from(vec![
            Span::styled("IQ estimate  ", Style::default().fg(colors.dim())),
            Span::styled(
                report.iq_score.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {} percentile", ordinal(report.percentile)),
                Style::default().fg(colors.fg()),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled(
                report.classification.clone(),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", report.classification_descriptor),
                Style::default().fg(colors.dim()),
            ),
        ]));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            format!(
                "Raw {}/{}   Weighted {:.1}/{:.1}",
                report.raw_score,
                report.total_questions,
                report.weighted_score,
                report.max_weighted_score,
            ),
            Style::default().fg(colors.fg()),
        )));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            "By category",
            Style::default().fg(colors.dim()),
        )));
        for cat in &report.categories {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<22}", cat.label),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(
                    bar(cat.percentage, 10),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled(
                    format!(" {}/{} ({}%)", cat.correct, cat.total, cat.percentage),
                    Style::default().fg(colors.dim()),
                ),
            ]));
        }
        lines.push(Line::from(""));

        let d = &report.difficulty_breakdown;
        lines.push(Line::from(Span::styled(
            format!(
                "By difficulty   easy {}/{}   medium {}/{}   hard {}/{}",
                d.easy.correct,
                d.easy.total,
                d.medium.correct,
                d.medium.total,
                d.hard.correct,
                d.hard.total,
            ),
            Style::default().fg(colors.fg()),
        )));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            format!(
                "Time {}   avg {}/question   fastest {}   slowest {}",
                format_duration(report.total_time_ms),
                format_duration(report.avg_time_per_question_ms),
                format_duration(report.fastest_question_ms),
                format_duration(report.slowest_question_ms),
            ),
            Style::default().fg(colors.dim()),
        )));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            "Share token (paste into logiq --decode):",
            Style::default().fg(colors.dim()),
        )));
        lines.push(Line::from(Span::styled(
            self.permalink.to_string(),
            Style::default().fg(colors.warning()),
        )));

        let panel = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        panel.render(inner, buf);
    }
}

pub struct PracticeResultsPanel<'a> {
    pub report: &'a PracticeReport,
    pub theme: &'a Theme,
}

impl Widget for &PracticeResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                " Practice Results ",
                Style::default().fg(colors.accent()),
            )))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!(
                "{} of {} correct",
                report.correct_count, report.total_questions
            ),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        for (i, result) in report.results.iter().enumerate() {
            let (marker, color) = if result.is_correct {
                ("✓", colors.success())
            } else {
                ("✗", colors.error())
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {marker} "), Style::default().fg(color)),
                Span::styled(
                    format!("{}. {}", i + 1, result.question.prompt),
                    Style::default().fg(colors.fg()),
                ),
            ]));
            if !result.is_correct {
                let correct = &result.question.options[result.question.answer];
                let given = result
                    .user_answer
                    .and_then(|a| result.question.options.get(a))
                    .map(|s| s.as_str())
                    .unwrap_or("no answer");
                lines.push(Line::from(Span::styled(
                    format!("     answer: {correct}   yours: {given}"),
                    Style::default().fg(colors.dim()),
                )));
            }
        }

        let panel = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        panel.render(inner, buf);
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
