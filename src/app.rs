use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::QuestionBank;
use crate::config::Config;
use crate::permalink;
use crate::scoring::{PracticeReport, ScoreReport};
use crate::session::{Mode, Outcome, QuizSession, Status};
use crate::store::json_store::JsonStore;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    Results,
    PracticeResults,
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct App {
    pub screen: AppScreen,
    pub session: Option<QuizSession>,
    pub last_report: Option<ScoreReport>,
    pub last_permalink: Option<String>,
    pub last_practice: Option<PracticeReport>,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub bank: QuestionBank,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(theme_override: Option<&str>) -> Result<Self> {
        let mut config = Config::load().unwrap_or_default();
        if let Some(name) = theme_override {
            config.theme = name.to_string();
        }
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let bank = QuestionBank::load()?;
        let store = JsonStore::new().ok();

        let has_saved = store
            .as_ref()
            .map(|s| s.has_snapshot(now_ms()))
            .unwrap_or(false);
        let menu = Menu::new(theme, has_saved);

        Ok(Self {
            screen: AppScreen::Menu,
            session: None,
            last_report: None,
            last_permalink: None,
            last_practice: None,
            menu,
            theme,
            config,
            bank,
            store,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        })
    }

    pub fn has_saved_session(&self) -> bool {
        self.store
            .as_ref()
            .map(|s| s.has_snapshot(now_ms()))
            .unwrap_or(false)
    }

    pub fn start_full(&mut self, now_ms: i64) {
        self.session = Some(QuizSession::start_full(&self.bank, &mut self.rng, now_ms));
        self.screen = AppScreen::Quiz;
        self.autosave(now_ms);
    }

    pub fn start_practice(&mut self, now_ms: i64) {
        self.session = Some(QuizSession::start_practice(
            &self.bank,
            &mut self.rng,
            now_ms,
        ));
        self.screen = AppScreen::Quiz;
    }

    /// Load the saved snapshot and continue it. The snapshot is consumed:
    /// whatever happens next, the stale file must not resurrect an older
    /// point in the same session. A snapshot that vanished or fails to
    /// restore falls back to a fresh full session.
    pub fn resume_saved(&mut self, now_ms: i64) {
        let snapshot = self.store.as_ref().and_then(|s| {
            let snapshot = s.load_snapshot(now_ms);
            s.clear_snapshot();
            snapshot
        });

        match snapshot.map(|s| QuizSession::resume(s, now_ms)) {
            Some(Ok(session)) => {
                self.session = Some(session);
                self.screen = AppScreen::Quiz;
                self.autosave(now_ms);
            }
            _ => self.start_full(now_ms),
        }
    }

    pub fn select_answer(&mut self, option_index: usize, now_ms: i64) {
        if let Some(ref mut session) = self.session {
            if session.select_answer(option_index).is_ok() {
                self.autosave(now_ms);
            }
        }
    }

    pub fn toggle_flag(&mut self, now_ms: i64) {
        if let Some(ref mut session) = self.session {
            if session.toggle_flag().is_ok() {
                self.autosave(now_ms);
            }
        }
    }

    pub fn next_question(&mut self, now_ms: i64) {
        if let Some(ref mut session) = self.session {
            if session.next(now_ms).is_ok() {
                self.autosave(now_ms);
            }
        }
    }

    pub fn prev_question(&mut self, now_ms: i64) {
        if let Some(ref mut session) = self.session {
            if session.prev(now_ms).is_ok() {
                self.autosave(now_ms);
            }
        }
    }

    pub fn go_to_question(&mut self, index: usize, now_ms: i64) {
        if let Some(ref mut session) = self.session {
            if session.go_to(index, now_ms).is_ok() {
                self.autosave(now_ms);
            }
        }
    }

    /// Clock update. Auto-submits when the budget runs out, so an expired
    /// session never lingers on screen.
    pub fn tick(&mut self, now_ms: i64) {
        let Some(ref mut session) = self.session else {
            return;
        };
        session.tick(now_ms);
        if session.is_out_of_time() {
            self.finish(now_ms);
        }
    }

    pub fn finish(&mut self, now_ms: i64) {
        let Some(ref mut session) = self.session else {
            return;
        };
        if session.status() != Status::Active {
            return;
        }

        let outcome = match session.finish(now_ms) {
            Ok(outcome) => outcome.clone(),
            Err(_) => return,
        };

        if let Some(ref store) = self.store {
            store.clear_snapshot();
        }
        self.session = None;

        match outcome {
            Outcome::Full(report) => {
                self.last_permalink = Some(permalink::encode(&report, now_ms));
                self.last_report = Some(report);
                self.screen = AppScreen::Results;
            }
            Outcome::Practice(report) => {
                self.last_practice = Some(report);
                self.screen = AppScreen::PracticeResults;
            }
        }
    }

    /// Quit mid-quiz. Full sessions persist for later resume; practice
    /// rounds are throwaway.
    pub fn abandon_to_menu(&mut self, now_ms: i64) {
        if let Some(ref session) = self.session {
            if session.mode() == Mode::Full {
                self.autosave(now_ms);
            }
        }
        self.session = None;
        self.go_to_menu();
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.rebuild_menu();
    }

    fn rebuild_menu(&mut self) {
        let has_saved = self.has_saved_session();
        let selected = self.menu.selected;
        self.menu = Menu::new(self.theme, has_saved);
        self.menu.selected = selected.min(self.menu.items.len() - 1);
    }

    fn autosave(&self, now_ms: i64) {
        if let (Some(session), Some(store)) = (self.session.as_ref(), self.store.as_ref()) {
            if let Some(snapshot) = session.snapshot(now_ms) {
                let _ = store.save_snapshot(&snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FULL_TIME_MS;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        let mut app = App::new(None).unwrap();
        app.store = JsonStore::with_base_dir(dir.path().to_path_buf()).ok();
        app
    }

    #[test]
    fn test_full_flow_reaches_results() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.start_full(1_000);
        assert_eq!(app.screen, AppScreen::Quiz);
        assert!(app.session.is_some());

        for i in 0..30 {
            app.go_to_question(i, 2_000 + i as i64 * 1_000);
            app.select_answer(0, 2_000 + i as i64 * 1_000);
        }
        app.finish(40_000);

        assert_eq!(app.screen, AppScreen::Results);
        assert!(app.session.is_none());
        assert!(app.last_report.is_some());
        assert!(app.last_permalink.is_some());
        assert!(!app.has_saved_session());
    }

    #[test]
    fn test_abandon_full_saves_and_resume_restores() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.start_full(0);
        app.select_answer(2, 5_000);
        app.next_question(5_000);
        app.abandon_to_menu(10_000);

        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.has_saved_session());

        app.resume_saved(60_000);
        assert_eq!(app.screen, AppScreen::Quiz);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.answer_at(0), Some(2));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_resume_without_snapshot_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.resume_saved(1_000);
        assert_eq!(app.screen, AppScreen::Quiz);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.questions().len(), 30);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn test_practice_abandon_leaves_no_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.start_practice(0);
        app.select_answer(1, 1_000);
        app.abandon_to_menu(2_000);

        assert!(!app.has_saved_session());
    }

    #[test]
    fn test_tick_auto_submits_at_zero() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.start_full(0);
        app.select_answer(0, 1_000);
        app.tick(FULL_TIME_MS + 1);

        assert_eq!(app.screen, AppScreen::Results);
        assert!(app.session.is_none());
        assert!(app.last_report.is_some());
    }

    #[test]
    fn test_practice_flow_reaches_practice_results() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.start_practice(0);
        let total = app.session.as_ref().unwrap().questions().len();
        for i in 0..total {
            app.go_to_question(i, 1_000 + i as i64 * 500);
            app.select_answer(0, 1_000 + i as i64 * 500);
        }
        app.finish(10_000);

        assert_eq!(app.screen, AppScreen::PracticeResults);
        let report = app.last_practice.as_ref().unwrap();
        assert_eq!(report.total_questions as usize, total);
    }
}
