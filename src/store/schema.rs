use serde::{Deserialize, Serialize};

use crate::bank::Question;

pub const SCHEMA_VERSION: u32 = 1;

/// Saved sessions older than this are discarded on load.
pub const SNAPSHOT_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Persisted form of an in-progress full-mode session. Versioned so a
/// shape change invalidates old saves instead of half-parsing them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub schema_version: u32,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<usize>>,
    pub flagged: Vec<bool>,
    pub current_index: usize,
    pub time_remaining_ms: i64,
    pub start_time_ms: i64,
    pub question_elapsed_ms: Vec<i64>,
    pub question_entered_at_ms: Vec<Option<i64>>,
    pub saved_at_ms: i64,
}

impl SessionSnapshot {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.saved_at_ms > SNAPSHOT_MAX_AGE_MS
    }

    /// Parallel arrays must actually be parallel before a resume may trust
    /// them; anything else counts as corruption.
    pub fn is_consistent(&self) -> bool {
        let len = self.questions.len();
        len > 0
            && self.answers.len() == len
            && self.flagged.len() == len
            && self.question_elapsed_ms.len() == len
            && self.question_entered_at_ms.len() == len
            && self.current_index < len
            && self.time_remaining_ms >= 0
    }
}
