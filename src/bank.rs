use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

const QUESTIONS_JSON: &str = include_str!("../assets/questions.json");

pub const BANK_SIZE: usize = 30;
pub const QUESTIONS_PER_CATEGORY: usize = 6;

/// The five cognitive domains. Enum order is the fixed enumeration order
/// used by the practice selector and the serde keys double as the category
/// keys embedded in shared result tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "pattern-recognition")]
    PatternRecognition,
    #[serde(rename = "sequence-completion")]
    SequenceCompletion,
    #[serde(rename = "logical-deduction")]
    LogicalDeduction,
    #[serde(rename = "spatial-reasoning")]
    SpatialReasoning,
    #[serde(rename = "analogies")]
    Analogies,
}

pub const ALL_CATEGORIES: [Category; 5] = [
    Category::PatternRecognition,
    Category::SequenceCompletion,
    Category::LogicalDeduction,
    Category::SpatialReasoning,
    Category::Analogies,
];

impl Category {
    pub fn key(self) -> &'static str {
        match self {
            Category::PatternRecognition => "pattern-recognition",
            Category::SequenceCompletion => "sequence-completion",
            Category::LogicalDeduction => "logical-deduction",
            Category::SpatialReasoning => "spatial-reasoning",
            Category::Analogies => "analogies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::PatternRecognition => "Pattern Recognition",
            Category::SequenceCompletion => "Sequence Completion",
            Category::LogicalDeduction => "Logical Deduction",
            Category::SpatialReasoning => "Spatial Reasoning",
            Category::Analogies => "Analogies",
        }
    }
}

/// One catalog entry. Cells in `grid` / items in `sequence` are glyph
/// strings; a single "?" cell marks the missing position. At most one of
/// the two is present (neither for pure text questions).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub category: Category,
    pub difficulty: u8,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<String>>,
    pub options: Vec<String>,
    pub answer: usize,
}

/// The static 30-question catalog. Parsed from the embedded JSON once at
/// startup and read-only afterwards.
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn load() -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(QUESTIONS_JSON)?;
        let bank = Self { questions };
        bank.validate()?;
        Ok(bank)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.questions.len() != BANK_SIZE {
            bail!(
                "question catalog has {} entries, expected {BANK_SIZE}",
                self.questions.len()
            );
        }

        let mut seen_ids = std::collections::HashSet::new();
        for q in &self.questions {
            if !seen_ids.insert(q.id) {
                bail!("duplicate question id {}", q.id);
            }
            if !(1..=5).contains(&q.difficulty) {
                bail!("question {} has difficulty {} outside 1..=5", q.id, q.difficulty);
            }
            if q.options.is_empty() || q.answer >= q.options.len() {
                bail!(
                    "question {} answer index {} out of range for {} options",
                    q.id,
                    q.answer,
                    q.options.len()
                );
            }
            if q.grid.is_some() && q.sequence.is_some() {
                bail!("question {} has both a grid and a sequence", q.id);
            }
        }

        for cat in ALL_CATEGORIES {
            let count = self.questions.iter().filter(|q| q.category == cat).count();
            if count != QUESTIONS_PER_CATEGORY {
                bail!(
                    "category {} has {count} questions, expected {QUESTIONS_PER_CATEGORY}",
                    cat.key()
                );
            }
        }

        Ok(())
    }
}
