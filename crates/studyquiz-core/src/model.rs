//! Core data model types for studyquiz.
//!
//! A [`Quiz`] is an ordered list of immutable [`Question`]s. Each question
//! carries one [`QuestionKind`] variant holding the fields that kind needs
//! for grading.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::answer::{option_key, AnswerValue};

/// Identifier for questions, parts and matching items.
///
/// Quiz files write ids either as integers or as strings; both forms
/// deserialize into the same textual id, so `1` and `"1"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for Id {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
        Ok(Id(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Id, E> {
        Ok(Id(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
        Ok(Id(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
        Ok(Id(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

/// A loaded quiz.
#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    /// Unique identifier, also the key in the progress store.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    pub description: String,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: &Id) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Sum of every question's points.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// A single quiz question.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: Id,
    /// Prompt text shown to the learner.
    pub question: String,
    /// Points awarded for a fully correct answer.
    pub points: u32,
    pub hint: Option<String>,
    /// Figure file name, relative to the quiz's figure directory.
    pub image: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

pub(crate) const DEFAULT_POINTS: u32 = 1;

/// Kind-specific question data, tagged by the quiz file's `type` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    ShortAnswer(ShortAnswer),
    SingleChoice(SingleChoice),
    MultipleChoice(MultipleChoice),
    Calculation(Calculation),
    MultiPart(MultiPart),
    Matching(Matching),
    /// A `type` this version does not know how to grade.
    Unknown { declared: String },
}

impl QuestionKind {
    /// The `type` tag as written in quiz files.
    pub fn type_name(&self) -> &str {
        match self {
            QuestionKind::ShortAnswer(_) => "short_answer",
            QuestionKind::SingleChoice(_) => "single_choice",
            QuestionKind::MultipleChoice(_) => "multiple_choice",
            QuestionKind::Calculation(_) => "calculation",
            QuestionKind::MultiPart(_) => "multi_part",
            QuestionKind::Matching(_) => "matching",
            QuestionKind::Unknown { declared } => declared,
        }
    }

    /// Display label for the question type.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::ShortAnswer(_) => "Short Answer",
            QuestionKind::MultipleChoice(_) => "Multiple Choice (Multiple Select)",
            QuestionKind::SingleChoice(_) => "Single Choice",
            QuestionKind::Calculation(_) => "Calculation",
            QuestionKind::MultiPart(_) => "Multi-Part Question",
            QuestionKind::Matching(_) => "Matching",
            QuestionKind::Unknown { .. } => "Unknown",
        }
    }

    /// Whether an answer of this shape belongs to this kind.
    pub fn accepts(&self, answer: &AnswerValue) -> bool {
        match self {
            QuestionKind::ShortAnswer(_)
            | QuestionKind::SingleChoice(_)
            | QuestionKind::Calculation(_) => matches!(answer, AnswerValue::Text(_)),
            QuestionKind::MultipleChoice(_) => matches!(answer, AnswerValue::Choices(_)),
            QuestionKind::MultiPart(_) | QuestionKind::Matching(_) => {
                matches!(answer, AnswerValue::Mapping(_))
            }
            QuestionKind::Unknown { .. } => true,
        }
    }

    /// Reference answer rendered for review output.
    pub fn reference_answer(&self) -> String {
        match self {
            QuestionKind::MultipleChoice(q) => q.correct_answers.join(", "),
            QuestionKind::SingleChoice(q) => q.correct_answer.clone(),
            QuestionKind::ShortAnswer(q) => q.answer.clone().unwrap_or_else(|| "N/A".into()),
            QuestionKind::Calculation(q) => q
                .expected_answers
                .first()
                .cloned()
                .unwrap_or_else(|| "N/A".into()),
            QuestionKind::MultiPart(q) => match &q.expected_answers {
                Some(expected) if !expected.is_empty() => expected
                    .iter()
                    .map(|(part, accepted)| {
                        format!("{part}: {}", accepted.first().map_or("", String::as_str))
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
                _ => "N/A".into(),
            },
            QuestionKind::Matching(q) if !q.items.is_empty() => q
                .items
                .iter()
                .map(|item| format!("{}: {}", item.id, item.correct_answer))
                .collect::<Vec<_>>()
                .join("; "),
            QuestionKind::Matching(_) | QuestionKind::Unknown { .. } => "N/A".into(),
        }
    }
}

/// Free-text question graded by keyword matching.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswer {
    /// Without keywords the answer can only be reviewed manually.
    pub keywords: Option<Keywords>,
    /// Model answer, shown during review.
    pub answer: Option<String>,
}

/// Keyword lists for short-answer grading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Keywords {
    pub required: Vec<String>,
    pub bonus: Vec<String>,
}

/// Exactly one option is correct.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoice {
    pub options: Vec<String>,
    /// Option key, e.g. `"B"` for the option `"B. UDP"`.
    pub correct_answer: String,
}

/// Any subset of the options may be correct.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoice {
    pub options: Vec<String>,
    pub correct_answers: Vec<String>,
}

impl MultipleChoice {
    /// Option keys offered to the learner.
    pub fn option_keys(&self) -> Vec<&str> {
        self.options.iter().map(|o| option_key(o)).collect()
    }
}

impl SingleChoice {
    /// Option keys offered to the learner.
    pub fn option_keys(&self) -> Vec<&str> {
        self.options.iter().map(|o| option_key(o)).collect()
    }
}

/// Numeric or short textual result, graded with tolerance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    /// Accepted answers; the first one is the numeric reference.
    pub expected_answers: Vec<String>,
}

/// A question split into separately answered parts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPart {
    pub parts: Vec<Part>,
    /// Accepted answers per part id.
    pub expected_answers: Option<BTreeMap<Id, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub part: Id,
    pub question: String,
}

/// Match each item's description to one of the shared options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Matching {
    pub items: Vec<MatchItem>,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchItem {
    pub id: Id,
    pub description: String,
    pub correct_answer: String,
}
