use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bank::{Question, QuestionBank};
use crate::scoring::{self, PracticeReport, ScoreReport};
use crate::selector;
use crate::store::schema::SessionSnapshot;

pub const FULL_TIME_MS: i64 = 25 * 60 * 1000;
pub const PRACTICE_TIME_MS: i64 = 5 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Full,
    Practice,
}

impl Mode {
    pub fn budget_ms(self) -> i64 {
        match self {
            Mode::Full => FULL_TIME_MS,
            Mode::Practice => PRACTICE_TIME_MS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Practice => "practice",
        }
    }
}

/// A session value only exists while there is a quiz; "idle" is the absence
/// of one (the app holds `Option<QuizSession>`). Finished is terminal —
/// taking the quiz again means constructing a new session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    Finished,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Full(ScoreReport),
    Practice(PracticeReport),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("operation requires an active session")]
    NotActive,
    #[error("question index {index} out of range ({len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("saved session snapshot is inconsistent")]
    BadSnapshot,
}

/// The quiz session state machine. Owns every mutable piece of session
/// state; all transitions take `now_ms` (epoch milliseconds) instead of
/// reading a clock, so the machine itself has no timers and tests can run
/// on a simulated clock. The event loop is the scheduler that feeds it
/// `tick`/`finish`.
#[derive(Debug)]
pub struct QuizSession {
    status: Status,
    mode: Mode,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Option<usize>>,
    flagged: Vec<bool>,
    start_time_ms: i64,
    end_time_ms: Option<i64>,
    // Accumulated per-question time, committed when navigating away.
    question_elapsed_ms: Vec<i64>,
    // Timestamp the current visit to each question began; None = not visited.
    question_entered_at_ms: Vec<Option<i64>>,
    time_remaining_ms: i64,
    outcome: Option<Outcome>,
}

impl QuizSession {
    pub fn start_full(bank: &QuestionBank, rng: &mut impl Rng, now_ms: i64) -> Self {
        let questions = selector::select_full_session(bank, rng);
        Self::new_active(Mode::Full, questions, now_ms)
    }

    pub fn start_practice(bank: &QuestionBank, rng: &mut impl Rng, now_ms: i64) -> Self {
        let questions = selector::select_practice_session(bank, rng);
        Self::new_active(Mode::Practice, questions, now_ms)
    }

    fn new_active(mode: Mode, questions: Vec<Question>, now_ms: i64) -> Self {
        let len = questions.len();
        let mut entered_at = vec![None; len];
        if len > 0 {
            entered_at[0] = Some(now_ms);
        }
        Self {
            status: Status::Active,
            mode,
            questions,
            current_index: 0,
            answers: vec![None; len],
            flagged: vec![false; len],
            start_time_ms: now_ms,
            end_time_ms: None,
            question_elapsed_ms: vec![0; len],
            question_entered_at_ms: entered_at,
            time_remaining_ms: mode.budget_ms(),
            outcome: None,
        }
    }

    /// Rebuild an active full-mode session from a persisted snapshot. Wall
    /// time that passed since the save is deducted from the remaining
    /// budget, and the start time is back-dated so `tick` keeps working as
    /// a pure recomputation from absolute time.
    pub fn resume(snapshot: SessionSnapshot, now_ms: i64) -> Result<Self, SessionError> {
        if !snapshot.is_consistent() {
            return Err(SessionError::BadSnapshot);
        }
        let budget = Mode::Full.budget_ms();
        let elapsed_since_save = now_ms - snapshot.saved_at_ms;
        let remaining = (snapshot.time_remaining_ms - elapsed_since_save).max(0);

        let len = snapshot.questions.len();
        let mut entered_at = vec![None; len];
        entered_at[snapshot.current_index] = Some(now_ms);

        Ok(Self {
            status: Status::Active,
            mode: Mode::Full,
            questions: snapshot.questions,
            current_index: snapshot.current_index,
            answers: snapshot.answers,
            flagged: snapshot.flagged,
            start_time_ms: now_ms - (budget - remaining),
            end_time_ms: None,
            question_elapsed_ms: snapshot.question_elapsed_ms,
            question_entered_at_ms: entered_at,
            time_remaining_ms: remaining,
            outcome: None,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn answer_at(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn flagged(&self) -> &[bool] {
        &self.flagged
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.get(index).copied().unwrap_or(false)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn time_remaining_ms(&self) -> i64 {
        self.time_remaining_ms
    }

    pub fn start_time_ms(&self) -> i64 {
        self.start_time_ms
    }

    pub fn end_time_ms(&self) -> Option<i64> {
        self.end_time_ms
    }

    pub fn question_elapsed_ms(&self) -> &[i64] {
        &self.question_elapsed_ms
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.status {
            Status::Active => Ok(()),
            Status::Finished => Err(SessionError::NotActive),
        }
    }

    /// Record the user's choice for the current question. Last write wins;
    /// re-selecting the same option is a no-op.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), SessionError> {
        self.ensure_active()?;
        let options = self.current_question().options.len();
        if option_index >= options {
            return Err(SessionError::OptionOutOfRange {
                index: option_index,
                len: options,
            });
        }
        self.answers[self.current_index] = Some(option_index);
        Ok(())
    }

    pub fn toggle_flag(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.flagged[self.current_index] = !self.flagged[self.current_index];
        Ok(())
    }

    /// Jump to any question. Re-entrant: jumping to the current question
    /// commits its elapsed time and restarts its visit timer.
    pub fn go_to(&mut self, index: usize, now_ms: i64) -> Result<(), SessionError> {
        self.ensure_active()?;
        if index >= self.questions.len() {
            return Err(SessionError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.commit_current_elapsed(now_ms);
        self.current_index = index;
        self.question_entered_at_ms[index] = Some(now_ms);
        Ok(())
    }

    pub fn next(&mut self, now_ms: i64) -> Result<(), SessionError> {
        self.ensure_active()?;
        let target = (self.current_index + 1).min(self.questions.len() - 1);
        self.go_to(target, now_ms)
    }

    pub fn prev(&mut self, now_ms: i64) -> Result<(), SessionError> {
        self.ensure_active()?;
        let target = self.current_index.saturating_sub(1);
        self.go_to(target, now_ms)
    }

    /// Recompute the countdown from absolute elapsed time. Never
    /// accumulates deltas, so missed or late ticks cannot drift the clock.
    /// Safe to call in any state; a tick racing a finish is ignored.
    pub fn tick(&mut self, now_ms: i64) {
        if self.status != Status::Active {
            return;
        }
        self.time_remaining_ms = (self.mode.budget_ms() - (now_ms - self.start_time_ms)).max(0);
    }

    pub fn is_out_of_time(&self) -> bool {
        self.status == Status::Active && self.time_remaining_ms <= 0
    }

    /// Close out the session: commit the current question's time, score
    /// (full mode) or tally (practice mode), and transition to Finished.
    /// Valid at `time_remaining_ms == 0` — auto-submission uses the same
    /// path as a manual submit.
    pub fn finish(&mut self, now_ms: i64) -> Result<&Outcome, SessionError> {
        self.ensure_active()?;
        self.commit_current_elapsed(now_ms);
        self.end_time_ms = Some(now_ms);

        let outcome = match self.mode {
            Mode::Full => Outcome::Full(scoring::calculate_results(
                &self.questions,
                &self.answers,
                self.start_time_ms,
                now_ms,
                &self.question_elapsed_ms,
            )),
            Mode::Practice => {
                Outcome::Practice(scoring::practice_results(&self.questions, &self.answers))
            }
        };

        self.status = Status::Finished;
        Ok(self.outcome.insert(outcome))
    }

    /// Snapshot for auto-save. Only active full-mode sessions persist;
    /// practice runs are throwaway.
    pub fn snapshot(&self, now_ms: i64) -> Option<SessionSnapshot> {
        if self.status != Status::Active || self.mode != Mode::Full {
            return None;
        }
        Some(SessionSnapshot {
            schema_version: crate::store::schema::SCHEMA_VERSION,
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            flagged: self.flagged.clone(),
            current_index: self.current_index,
            time_remaining_ms: self.time_remaining_ms,
            start_time_ms: self.start_time_ms,
            question_elapsed_ms: self.question_elapsed_ms.clone(),
            question_entered_at_ms: self.question_entered_at_ms.clone(),
            saved_at_ms: now_ms,
        })
    }

    fn commit_current_elapsed(&mut self, now_ms: i64) {
        if let Some(entered) = self.question_entered_at_ms[self.current_index] {
            self.question_elapsed_ms[self.current_index] += now_ms - entered;
            self.question_entered_at_ms[self.current_index] = Some(now_ms);
        }
    }
}
