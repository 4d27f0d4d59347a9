//! End-to-end flows: session lifecycle, scoring, persistence, and share
//! tokens working together the way the binary drives them.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use logiq::bank::QuestionBank;
use logiq::permalink;
use logiq::scoring;
use logiq::session::{FULL_TIME_MS, Mode, Outcome, QuizSession, Status};
use logiq::store::json_store::JsonStore;
use logiq::store::schema::SNAPSHOT_MAX_AGE_MS;

fn bank() -> QuestionBank {
    QuestionBank::load().expect("bundled question catalog must parse")
}

fn answer_all(session: &mut QuizSession, pick: impl Fn(&logiq::bank::Question) -> usize, t0: i64) {
    for i in 0..session.questions().len() {
        let now = t0 + i as i64 * 1_000;
        session.go_to(i, now).unwrap();
        let option = pick(&session.questions()[i]);
        session.select_answer(option).unwrap();
    }
}

#[test]
fn perfect_full_session_hits_ceiling() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(7);
    let mut session = QuizSession::start_full(&bank, &mut rng, 0);

    answer_all(&mut session, |q| q.answer, 1_000);
    let outcome = session.finish(60_000).unwrap();

    let Outcome::Full(report) = outcome else {
        panic!("full session must produce a full report");
    };
    assert_eq!(report.iq_score, 145);
    assert_eq!(report.percentile, 100);
    assert_eq!(report.classification, "Exceptionally Gifted");
    assert_eq!(report.raw_score, 30);
    assert_eq!(session.status(), Status::Finished);
}

#[test]
fn all_wrong_full_session_hits_floor() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(7);
    let mut session = QuizSession::start_full(&bank, &mut rng, 0);

    // Pick a wrong option for every question
    answer_all(
        &mut session,
        |q| if q.answer == 0 { 1 } else { 0 },
        1_000,
    );
    let outcome = session.finish(60_000).unwrap();

    let Outcome::Full(report) = outcome else {
        panic!("full session must produce a full report");
    };
    assert_eq!(report.iq_score, 55);
    assert_eq!(report.percentile, 0);
    assert_eq!(report.classification, "Extremely Low");
    assert_eq!(report.raw_score, 0);
}

#[test]
fn unanswered_questions_score_as_wrong() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(11);
    let mut session = QuizSession::start_full(&bank, &mut rng, 0);

    // Answer only the first half correctly; leave the rest blank.
    for i in 0..15 {
        session.go_to(i, 1_000 + i as i64).unwrap();
        let option = session.questions()[i].answer;
        session.select_answer(option).unwrap();
    }
    let outcome = session.finish(30_000).unwrap();

    let Outcome::Full(report) = outcome else {
        panic!("full session must produce a full report");
    };
    assert_eq!(report.raw_score, 15);
    assert!(report.iq_score < 145);
}

#[test]
fn practice_session_tallies_without_iq() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut session = QuizSession::start_practice(&bank, &mut rng, 0);

    assert_eq!(session.mode(), Mode::Practice);
    assert_eq!(session.questions().len(), 5);
    for q in session.questions() {
        assert!(q.difficulty <= 3);
    }

    answer_all(&mut session, |q| q.answer, 1_000);
    let outcome = session.finish(10_000).unwrap();

    let Outcome::Practice(report) = outcome else {
        panic!("practice session must produce a practice report");
    };
    assert_eq!(report.correct_count, 5);
    assert_eq!(report.total_questions, 5);
    assert!(report.results.iter().all(|r| r.is_correct));
}

#[test]
fn save_resume_preserves_progress_and_clock() {
    let bank = bank();
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut rng = SmallRng::seed_from_u64(42);

    let mut session = QuizSession::start_full(&bank, &mut rng, 0);
    session.select_answer(2).unwrap();
    session.next(30_000).unwrap();
    session.select_answer(1).unwrap();
    session.toggle_flag().unwrap();
    session.tick(120_000);

    let snapshot = session.snapshot(120_000).expect("active full session must snapshot");
    store.save_snapshot(&snapshot).unwrap();
    drop(session);

    // A different process, two minutes later
    let loaded = store.load_snapshot(180_000).expect("fresh snapshot must load");
    let mut resumed = QuizSession::resume(loaded, 180_000).unwrap();

    assert_eq!(resumed.current_index(), 1);
    assert_eq!(resumed.answer_at(0), Some(2));
    assert_eq!(resumed.answer_at(1), Some(1));
    assert!(resumed.is_flagged(1));
    // 120s elapsed before saving plus 60s while the app was closed
    assert_eq!(resumed.time_remaining_ms(), FULL_TIME_MS - 180_000);

    // Ticking after resume keeps draining from the resumed point
    resumed.tick(180_000 + 10_000);
    assert_eq!(resumed.time_remaining_ms(), FULL_TIME_MS - 190_000);
}

#[test]
fn stale_snapshot_is_discarded_on_load() {
    let bank = bank();
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);

    let session = QuizSession::start_full(&bank, &mut rng, 0);
    let snapshot = session.snapshot(1_000).unwrap();
    store.save_snapshot(&snapshot).unwrap();

    let after_expiry = 1_000 + SNAPSHOT_MAX_AGE_MS + 1;
    assert!(store.load_snapshot(after_expiry).is_none());
    // The stale file is gone, not just ignored
    assert!(!store.has_snapshot(0));
}

#[test]
fn finished_report_survives_the_share_token() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(99);
    let mut session = QuizSession::start_full(&bank, &mut rng, 0);

    for i in 0..session.questions().len() {
        session.go_to(i, 1_000 + i as i64 * 2_000).unwrap();
        // Alternate right and wrong answers
        let q = session.questions()[i].clone();
        let option = if i % 2 == 0 { q.answer } else { (q.answer + 1) % q.options.len() };
        session.select_answer(option).unwrap();
    }
    let outcome = session.finish(70_000).unwrap();
    let Outcome::Full(report) = outcome.clone() else {
        panic!("full session must produce a full report");
    };

    let token = permalink::encode(&report, 1_700_000_000_000);
    let shared = permalink::decode(&token).expect("freshly encoded token must decode");
    assert!(shared.verified);
    assert_eq!(shared.report, report);
    assert_eq!(shared.shared_at_ms, 1_700_000_000_000);
}

#[test]
fn question_time_attribution_follows_navigation() {
    let bank = bank();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut session = QuizSession::start_full(&bank, &mut rng, 0);

    // 10s on q0, 25s on q1, back to q0 for 5s
    session.next(10_000).unwrap();
    session.go_to(0, 35_000).unwrap();
    session.finish(40_000).unwrap();

    let elapsed = session.question_elapsed_ms();
    assert_eq!(elapsed[0], 10_000 + 5_000);
    assert_eq!(elapsed[1], 25_000);
    assert_eq!(elapsed.iter().sum::<i64>(), 40_000);
}

#[test]
fn timing_stats_reach_the_report() {
    let bank = bank();
    let questions: Vec<_> = bank.questions().to_vec();
    let answers: Vec<Option<usize>> = questions.iter().map(|q| Some(q.answer)).collect();
    let times: Vec<i64> = (0..questions.len() as i64).map(|i| (i + 1) * 1_000).collect();
    let total: i64 = times.iter().sum();

    let report = scoring::calculate_results(&questions, &answers, 0, total, &times);
    assert_eq!(report.total_time_ms, total);
    assert_eq!(report.fastest_question_ms, 1_000);
    assert_eq!(report.slowest_question_ms, questions.len() as i64 * 1_000);
    assert_eq!(report.avg_time_per_question_ms, total / questions.len() as i64);
}
