use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::scoring::{CategoryScore, DifficultyBreakdown, ScoreReport, TierScore};

/// Keyed-hash secret baked into the client. The signature deters casual
/// link edits; it is not a cryptographic integrity boundary.
const PERMALINK_SECRET: &str = "logiq_permalink_integrity_v2_2026";

/// A decoded shared-result token: the report plus sharing metadata. Always
/// a read-only view, never a resumable session.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedReport {
    pub report: ScoreReport,
    pub shared_at_ms: i64,
    pub verified: bool,
}

/// Short-key wire form. Categories travel as
/// (key, correct, total, percentage, label) tuples and the difficulty
/// tiers as a flat six-number array to keep tokens compact.
#[derive(Serialize, Deserialize)]
struct CompactReport {
    i: u32,
    p: u32,
    c: String,
    d: String,
    r: u32,
    t: u32,
    w: f64,
    m: f64,
    k: Vec<(String, u32, u32, u32, String)>,
    b: [u32; 6],
    tt: i64,
    at: i64,
    ft: i64,
    st: i64,
    ts: i64,
}

/// Dual FNV-1a over the secret-prefixed payload, folded to base-36. Two
/// independent 32-bit accumulations widen the output to ~12 characters.
fn compute_signature(payload: &str) -> String {
    let mut h1: u32 = 0x811c_9dc5;
    let mut h2: u32 = 0x050c_5d1f;
    for b in PERMALINK_SECRET.bytes().chain([b':']).chain(payload.bytes()) {
        h1 ^= b as u32;
        h1 = h1.wrapping_mul(0x0100_0193);
        h2 ^= b as u32;
        h2 = h2.wrapping_mul(0x0100_01b3);
    }
    format!("{}{}", to_base36(h1), to_base36(h2))
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Encode a score report into a URL-safe token: base64url(JSON) plus a
/// dot-separated signature segment. `now_ms` is stamped into the token as
/// the share time.
pub fn encode(report: &ScoreReport, now_ms: i64) -> String {
    let compact = CompactReport {
        i: report.iq_score,
        p: report.percentile,
        c: report.classification.clone(),
        d: report.classification_descriptor.clone(),
        r: report.raw_score,
        t: report.total_questions,
        w: report.weighted_score,
        m: report.max_weighted_score,
        k: report
            .categories
            .iter()
            .map(|c| (c.key.clone(), c.correct, c.total, c.percentage, c.label.clone()))
            .collect(),
        b: [
            report.difficulty_breakdown.easy.correct,
            report.difficulty_breakdown.easy.total,
            report.difficulty_breakdown.medium.correct,
            report.difficulty_breakdown.medium.total,
            report.difficulty_breakdown.hard.correct,
            report.difficulty_breakdown.hard.total,
        ],
        tt: report.total_time_ms,
        at: report.avg_time_per_question_ms,
        ft: report.fastest_question_ms,
        st: report.slowest_question_ms,
        ts: now_ms,
    };

    // CompactReport is a plain struct of serializable fields; encoding it
    // cannot fail, but the codec contract is "never panic" either way.
    let json = serde_json::to_string(&compact).unwrap_or_default();
    let payload = URL_SAFE_NO_PAD.encode(json.as_bytes());
    let signature = compute_signature(&payload);
    format!("{payload}.{signature}")
}

/// Decode a shared-result token. Returns None for any malformed, truncated,
/// or tampered input. Tokens carrying a signature segment must verify;
/// bare tokens (legacy links) are accepted unverified.
pub fn decode(token: &str) -> Option<SharedReport> {
    let (payload, verified) = match token.rfind('.') {
        Some(dot) if dot > 0 => {
            let payload = &token[..dot];
            let signature = &token[dot + 1..];
            if signature != compute_signature(payload) {
                return None;
            }
            (payload, true)
        }
        _ => (token, false),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let json = String::from_utf8(bytes).ok()?;
    let compact: CompactReport = serde_json::from_str(&json).ok()?;

    let report = ScoreReport {
        iq_score: compact.i,
        percentile: compact.p,
        classification: compact.c,
        classification_descriptor: compact.d,
        raw_score: compact.r,
        total_questions: compact.t,
        weighted_score: compact.w,
        max_weighted_score: compact.m,
        categories: compact
            .k
            .into_iter()
            .map(|(key, correct, total, percentage, label)| CategoryScore {
                key,
                label,
                correct,
                total,
                percentage,
            })
            .collect(),
        difficulty_breakdown: DifficultyBreakdown {
            easy: TierScore { correct: compact.b[0], total: compact.b[1] },
            medium: TierScore { correct: compact.b[2], total: compact.b[3] },
            hard: TierScore { correct: compact.b[4], total: compact.b[5] },
        },
        total_time_ms: compact.tt,
        avg_time_per_question_ms: compact.at,
        fastest_question_ms: compact.ft,
        slowest_question_ms: compact.st,
    };

    Some(SharedReport {
        report,
        shared_at_ms: compact.ts,
        verified,
    })
}
