pub mod state;

pub use state::{FULL_TIME_MS, Mode, Outcome, PRACTICE_TIME_MS, QuizSession, SessionError, Status};
