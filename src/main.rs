mod app;
mod bank;
mod config;
mod event;
mod permalink;
mod scoring;
mod selector;
mod session;
mod store;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen, now_ms};
use event::{AppEvent, EventHandler};
use ui::components::nav_strip::NavStrip;
use ui::components::question_card::QuestionCard;
use ui::components::results_panel::{PracticeResultsPanel, ResultsPanel};
use ui::components::timer_gauge::TimerGauge;
use ui::layout::AppLayout;

#[derive(Parser)]
#[command(name = "logiq", version, about = "Terminal cognitive assessment")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Start directly in a practice round")]
    practice: bool,

    #[arg(long, value_name = "TOKEN", help = "Decode a share token and print the report")]
    decode: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(token) = cli.decode {
        return print_decoded(&token);
    }

    let mut app = App::new(cli.theme.as_deref())?;
    if cli.practice {
        app.start_practice(now_ms());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn print_decoded(token: &str) -> Result<()> {
    let Some(shared) = permalink::decode(token) else {
        anyhow::bail!("token is malformed or has been tampered with");
    };
    let report = &shared.report;

    if !shared.verified {
        println!("warning: token carries no signature; results are unverified\n");
    }

    println!("IQ estimate     {}", report.iq_score);
    println!("Percentile      {}", report.percentile);
    println!(
        "Classification  {} ({})",
        report.classification, report.classification_descriptor
    );
    println!("Raw score       {}/{}", report.raw_score, report.total_questions);
    println!(
        "Weighted        {:.1}/{:.1}",
        report.weighted_score, report.max_weighted_score
    );
    println!();
    for cat in &report.categories {
        println!(
            "  {:<24} {}/{} ({}%)",
            cat.label, cat.correct, cat.total, cat.percentage
        );
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(now_ms()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Results | AppScreen::PracticeResults => handle_results_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.start_full(now_ms()),
        KeyCode::Char('2') => app.start_practice(now_ms()),
        KeyCode::Char('r') => {
            if app.has_saved_session() {
                app.resume_saved(now_ms());
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let selected_key = app.menu.items[app.menu.selected].key.clone();
            match selected_key.as_str() {
                "r" => app.resume_saved(now_ms()),
                "1" => app.start_full(now_ms()),
                "2" => app.start_practice(now_ms()),
                "q" => app.should_quit = true,
                _ => {}
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.abandon_to_menu(now_ms()),
        KeyCode::Char(ch @ '1'..='9') => {
            let option = ch as usize - '1' as usize;
            app.select_answer(option, now_ms());
        }
        KeyCode::Left | KeyCode::Char('h') => app.prev_question(now_ms()),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => app.next_question(now_ms()),
        KeyCode::Char('f') => app.toggle_flag(now_ms()),
        KeyCode::Char('s') => app.finish(now_ms()),
        KeyCode::Home => app.go_to_question(0, now_ms()),
        KeyCode::End => {
            if let Some(last) = app.session.as_ref().map(|s| s.questions().len() - 1) {
                app.go_to_question(last, now_ms());
            }
        }
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('n') => app.start_full(now_ms()),
        KeyCode::Char('p') => app.start_practice(now_ms()),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Results => render_results(frame, app),
        AppScreen::PracticeResults => render_practice_results(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        " logiq ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [1] Full  [2] Practice  [q] Quit ",
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(ref session) = app.session else {
        return;
    };

    let app_layout = AppLayout::new(area);

    let timer = TimerGauge {
        remaining_ms: session.time_remaining_ms(),
        budget_ms: session.mode().budget_ms(),
        warning_secs: app.config.timer_warning_secs,
        mode_label: session.mode().as_str(),
        theme: app.theme,
    };
    frame.render_widget(&timer, app_layout.header);

    let show_strip = app_layout.sidebar.is_none() && app_layout.tier.show_nav_strip(area.height);
    let main_layout = if show_strip {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(5)])
            .split(app_layout.main)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10)])
            .split(app_layout.main)
    };

    let index = session.current_index();
    let card = QuestionCard {
        question: session.current_question(),
        index,
        total: session.questions().len(),
        selected_option: session.answer_at(index),
        flagged: session.is_flagged(index),
        theme: app.theme,
    };
    frame.render_widget(&card, main_layout[0]);

    let strip = NavStrip {
        current_index: index,
        answers: session.answers(),
        flagged: session.flagged(),
        theme: app.theme,
    };
    if let Some(sidebar_area) = app_layout.sidebar {
        frame.render_widget(&strip, sidebar_area);
    } else if show_strip {
        frame.render_widget(&strip, main_layout[1]);
    }

    let hints = [
        "[1-6] answer",
        "[←/→] move",
        "[f] flag",
        "[s] submit",
        "[esc] save & exit",
    ];
    let hint_lines = ui::layout::pack_hint_lines(&hints, app_layout.footer.width as usize);
    let footer = Paragraph::new(
        hint_lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.dim()))))
            .collect::<Vec<_>>(),
    );
    frame.render_widget(footer, app_layout.footer);
}

fn render_results(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    if let (Some(report), Some(token)) = (app.last_report.as_ref(), app.last_permalink.as_deref()) {
        let centered = ui::layout::centered_rect(70, 90, area);
        let panel = ResultsPanel {
            report,
            permalink: token,
            theme: app.theme,
        };
        frame.render_widget(&panel, centered);

        let footer_area = ratatui::layout::Rect::new(
            area.x,
            area.bottom().saturating_sub(1),
            area.width,
            1,
        );
        let footer = Paragraph::new(Line::from(Span::styled(
            " [n] New assessment  [p] Practice  [q] Menu ",
            Style::default().fg(colors.dim()),
        )));
        frame.render_widget(footer, footer_area);
    }
}

fn render_practice_results(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    if let Some(report) = app.last_practice.as_ref() {
        let centered = ui::layout::centered_rect(70, 80, area);
        let panel = PracticeResultsPanel {
            report,
            theme: app.theme,
        };
        frame.render_widget(&panel, centered);

        let footer_area = ratatui::layout::Rect::new(
            area.x,
            area.bottom().saturating_sub(1),
            area.width,
            1,
        );
        let footer = Paragraph::new(Line::from(Span::styled(
            " [p] Another round  [n] Full assessment  [q] Menu ",
            Style::default().fg(colors.dim()),
        )));
        frame.render_widget(footer, footer_area);
    }
}
