use serde::{Deserialize, Serialize};

use crate::bank::{Category, Question};

/// Classification bands scanned top-down; the first band whose minimum the
/// clamped IQ meets wins.
pub const IQ_CLASSIFICATIONS: [(u32, &str, &str); 8] = [
    (145, "Exceptionally Gifted", "Top 0.1%"),
    (130, "Highly Gifted", "Top 2%"),
    (120, "Superior", "Top 9%"),
    (110, "Above Average", "Top 25%"),
    (90, "Average", "Middle 50%"),
    (80, "Below Average", "Bottom 25%"),
    (70, "Borderline", "Bottom 9%"),
    (0, "Extremely Low", "Bottom 2%"),
];

pub const IQ_MIN: u32 = 55;
pub const IQ_MAX: u32 = 145;

/// Harder questions contribute more to the weighted score.
pub fn difficulty_weight(difficulty: u8) -> f64 {
    match difficulty {
        1 => 1.0,
        2 => 1.3,
        3 => 1.6,
        4 => 2.0,
        5 => 2.5,
        _ => 1.0,
    }
}

/// Normal distribution CDF via the Abramowitz & Stegun rational
/// approximation. The exact coefficients matter: shared result links carry
/// percentiles computed with this formula, so it must reproduce them.
pub fn normal_cdf(z: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub key: String,
    pub label: String,
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierScore {
    pub correct: u32,
    pub total: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub easy: TierScore,
    pub medium: TierScore,
    pub hard: TierScore,
}

/// Everything a finished full session produces. Immutable once built; this
/// is the value the results screen renders and the permalink codec encodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub iq_score: u32,
    pub percentile: u32,
    pub classification: String,
    pub classification_descriptor: String,
    pub raw_score: u32,
    pub total_questions: u32,
    pub weighted_score: f64,
    pub max_weighted_score: f64,
    pub categories: Vec<CategoryScore>,
    pub difficulty_breakdown: DifficultyBreakdown,
    pub total_time_ms: i64,
    pub avg_time_per_question_ms: i64,
    pub fastest_question_ms: i64,
    pub slowest_question_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PracticeQuestionResult {
    pub question: Question,
    pub user_answer: Option<usize>,
    pub is_correct: bool,
}

/// Practice completions get a plain tally, never an IQ estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PracticeReport {
    pub results: Vec<PracticeQuestionResult>,
    pub correct_count: u32,
    pub total_questions: u32,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Turn a completed full session into a score report. Pure and
/// deterministic: no clock reads, no randomness, everything derives from
/// the arguments.
///
/// The question set must be non-empty; the selector guarantees that for
/// every real session and this function asserts it rather than producing a
/// NaN score.
pub fn calculate_results(
    questions: &[Question],
    answers: &[Option<usize>],
    start_time_ms: i64,
    end_time_ms: i64,
    question_times_ms: &[i64],
) -> ScoreReport {
    assert!(
        !questions.is_empty(),
        "scoring requires a non-empty question set"
    );
    assert_eq!(questions.len(), answers.len());

    let total_questions = questions.len() as u32;

    let mut correct_count: u32 = 0;
    let mut weighted_score = 0.0;
    let mut max_weighted_score = 0.0;

    // Category tallies keyed by first appearance in the presented order.
    let mut category_order: Vec<Category> = Vec::new();
    let mut category_tallies: Vec<TierScore> = Vec::new();
    let mut breakdown = DifficultyBreakdown::default();

    for (q, answer) in questions.iter().zip(answers) {
        let is_correct = *answer == Some(q.answer);
        let weight = difficulty_weight(q.difficulty);

        max_weighted_score += weight;
        if is_correct {
            correct_count += 1;
            weighted_score += weight;
        }

        let slot = match category_order.iter().position(|c| *c == q.category) {
            Some(i) => i,
            None => {
                category_order.push(q.category);
                category_tallies.push(TierScore::default());
                category_tallies.len() - 1
            }
        };
        category_tallies[slot].total += 1;
        if is_correct {
            category_tallies[slot].correct += 1;
        }

        let tier = match q.difficulty {
            0..=2 => &mut breakdown.easy,
            3 => &mut breakdown.medium,
            _ => &mut breakdown.hard,
        };
        tier.total += 1;
        if is_correct {
            tier.correct += 1;
        }
    }

    // Map the weighted percentage onto the IQ bell curve: 0% -> -3 sigma,
    // 50% -> 0, 100% -> +3 sigma, centered at 100 with SD 15.
    let weighted_percentage = weighted_score / max_weighted_score;
    let z_score = (weighted_percentage - 0.5) * 6.0;
    let iq_raw = (100.0 + z_score * 15.0).round() as i64;
    let iq_score = iq_raw.clamp(IQ_MIN as i64, IQ_MAX as i64) as u32;

    let percentile_z = (iq_score as f64 - 100.0) / 15.0;
    let percentile = (normal_cdf(percentile_z) * 100.0).round() as u32;

    let (_, classification, descriptor) = IQ_CLASSIFICATIONS
        .iter()
        .find(|(min, _, _)| iq_score >= *min)
        .copied()
        .unwrap_or(IQ_CLASSIFICATIONS[IQ_CLASSIFICATIONS.len() - 1]);

    let total_time_ms = end_time_ms - start_time_ms;
    let (avg, fastest, slowest) = if question_times_ms.is_empty() {
        (0, 0, 0)
    } else {
        let sum: i64 = question_times_ms.iter().sum();
        let avg = (sum as f64 / question_times_ms.len() as f64).round() as i64;
        let fastest = *question_times_ms.iter().min().unwrap_or(&0);
        let slowest = *question_times_ms.iter().max().unwrap_or(&0);
        (avg, fastest, slowest)
    };

    let categories = category_order
        .iter()
        .zip(&category_tallies)
        .map(|(cat, tally)| CategoryScore {
            key: cat.key().to_string(),
            label: cat.label().to_string(),
            correct: tally.correct,
            total: tally.total,
            percentage: ((tally.correct as f64 / tally.total as f64) * 100.0).round() as u32,
        })
        .collect();

    ScoreReport {
        iq_score,
        percentile,
        classification: classification.to_string(),
        classification_descriptor: descriptor.to_string(),
        raw_score: correct_count,
        total_questions,
        weighted_score: round1(weighted_score),
        max_weighted_score: round1(max_weighted_score),
        categories,
        difficulty_breakdown: breakdown,
        total_time_ms,
        avg_time_per_question_ms: avg,
        fastest_question_ms: fastest,
        slowest_question_ms: slowest,
    }
}

/// Practice tally: per-question correctness plus a count, nothing more.
pub fn practice_results(questions: &[Question], answers: &[Option<usize>]) -> PracticeReport {
    let results: Vec<PracticeQuestionResult> = questions
        .iter()
        .zip(answers)
        .map(|(q, answer)| PracticeQuestionResult {
            question: q.clone(),
            user_answer: *answer,
            is_correct: *answer == Some(q.answer),
        })
        .collect();
    let correct_count = results.iter().filter(|r| r.is_correct).count() as u32;
    PracticeReport {
        correct_count,
        total_questions: questions.len() as u32,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;

    fn bank_questions() -> Vec<Question> {
        QuestionBank::load().unwrap().questions().to_vec()
    }

    fn all_correct(questions: &[Question]) -> Vec<Option<usize>> {
        questions.iter().map(|q| Some(q.answer)).collect()
    }

    fn all_wrong(questions: &[Question]) -> Vec<Option<usize>> {
        // None = unanswered, which can never match the correct index.
        vec![None; questions.len()]
    }

    #[test]
    fn test_perfect_session_hits_the_ceiling() {
        let questions = bank_questions();
        let answers = all_correct(&questions);
        let times = vec![1000; questions.len()];
        let report = calculate_results(&questions, &answers, 0, 60_000, &times);
        assert_eq!(report.raw_score, 30);
        assert_eq!(report.iq_score, 145);
        assert_eq!(report.percentile, 100);
        assert_eq!(report.classification, "Exceptionally Gifted");
        assert_eq!(report.weighted_score, report.max_weighted_score);
    }

    #[test]
    fn test_blank_session_hits_the_floor() {
        let questions = bank_questions();
        let answers = all_wrong(&questions);
        let report = calculate_results(&questions, &answers, 0, 60_000, &[]);
        assert_eq!(report.raw_score, 0);
        assert_eq!(report.iq_score, 55);
        assert_eq!(report.percentile, 0);
        assert_eq!(report.classification, "Extremely Low");
        assert_eq!(report.avg_time_per_question_ms, 0);
        assert_eq!(report.fastest_question_ms, 0);
    }

    #[test]
    fn test_half_weighted_score_is_average() {
        // 50% weighted percentage maps to z = 0 -> IQ exactly 100.
        let questions = bank_questions();
        // Answer correctly on a subset maximizing closeness to half the
        // weighted total: instead, build a synthetic check with two equal
        // weights, one right one wrong.
        let pair = vec![questions[0].clone(), questions[0].clone()];
        let answers = vec![Some(pair[0].answer), None];
        let report = calculate_results(&pair, &answers, 0, 1000, &[500, 500]);
        assert_eq!(report.iq_score, 100);
        assert_eq!(report.percentile, 50);
        assert_eq!(report.classification, "Average");
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let questions = bank_questions();
        let answers: Vec<Option<usize>> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| if i % 2 == 0 { Some(q.answer) } else { Some(0) })
            .collect();
        let times: Vec<i64> = (0..questions.len() as i64).map(|i| i * 137).collect();
        let a = calculate_results(&questions, &answers, 100, 900_000, &times);
        let b = calculate_results(&questions, &answers, 100, 900_000, &times);
        assert_eq!(a, b);
    }

    #[test]
    fn test_more_correct_answers_never_lower_the_estimate() {
        let questions = bank_questions();
        let mut answers = all_wrong(&questions);
        let mut last_iq = 0;
        for i in 0..questions.len() {
            answers[i] = Some(questions[i].answer);
            let report = calculate_results(&questions, &answers, 0, 60_000, &[]);
            assert!(report.iq_score >= last_iq, "dropped after {} correct", i + 1);
            last_iq = report.iq_score;
        }
        assert_eq!(last_iq, 145);
    }

    #[test]
    fn test_bounds_hold_for_random_answer_vectors() {
        use rand::{Rng, SeedableRng, rngs::SmallRng};
        let questions = bank_questions();
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..200 {
            let answers: Vec<Option<usize>> = questions
                .iter()
                .map(|q| {
                    if rng.gen_bool(0.2) {
                        None
                    } else {
                        Some(rng.gen_range(0..q.options.len()))
                    }
                })
                .collect();
            let report = calculate_results(&questions, &answers, 0, 1, &[]);
            assert!((IQ_MIN..=IQ_MAX).contains(&report.iq_score));
            assert!(report.percentile <= 100);
        }
    }

    #[test]
    fn test_difficulty_tiers_partition_the_bank() {
        let questions = bank_questions();
        let answers = all_correct(&questions);
        let report = calculate_results(&questions, &answers, 0, 1, &[]);
        let b = report.difficulty_breakdown;
        assert_eq!(b.easy.total + b.medium.total + b.hard.total, 30);
        assert_eq!(b.easy.correct, b.easy.total);
    }

    #[test]
    fn test_category_breakdown_covers_all_five() {
        let questions = bank_questions();
        let answers = all_correct(&questions);
        let report = calculate_results(&questions, &answers, 0, 1, &[]);
        assert_eq!(report.categories.len(), 5);
        for cat in &report.categories {
            assert_eq!(cat.total, 6);
            assert_eq!(cat.percentage, 100);
        }
    }

    #[test]
    fn test_timing_stats() {
        let questions = bank_questions();
        let answers = all_correct(&questions);
        let mut times = vec![2000i64; questions.len()];
        times[0] = 500;
        times[29] = 9000;
        let report = calculate_results(&questions, &answers, 1000, 61_000, &times);
        assert_eq!(report.total_time_ms, 60_000);
        assert_eq!(report.fastest_question_ms, 500);
        assert_eq!(report.slowest_question_ms, 9000);
        let expected_avg =
            ((500 + 9000 + 2000 * 28) as f64 / 30.0).round() as i64;
        assert_eq!(report.avg_time_per_question_ms, expected_avg);
    }

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(3.0) - 0.99865).abs() < 1e-4);
        assert!((normal_cdf(-3.0) - 0.00135).abs() < 1e-4);
        // Symmetry of the approximation around zero.
        let z = 1.2345;
        assert!((normal_cdf(z) + normal_cdf(-z) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_practice_report_carries_no_iq() {
        let questions: Vec<Question> = bank_questions().into_iter().take(5).collect();
        let answers = vec![
            Some(questions[0].answer),
            Some(questions[1].answer),
            Some(questions[2].answer),
            None,
            Some((questions[4].answer + 1) % questions[4].options.len()),
        ];
        let report = practice_results(&questions, &answers);
        assert_eq!(report.correct_count, 3);
        assert_eq!(report.total_questions, 5);
        assert!(report.results[3].user_answer.is_none());
        assert!(!report.results[4].is_correct);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_scoring_empty_set_fails_loudly() {
        calculate_results(&[], &[], 0, 0, &[]);
    }
}
