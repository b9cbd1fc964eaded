//! Per-question answer grading with partial credit.
//!
//! [`grade_answer`] is the instant-feedback path: it dispatches on the
//! question kind and only hands each grader the answer shape it expects.
//! Anything it cannot interpret (unknown kinds, missing grading data,
//! answers of the wrong shape) degrades to a manual-review verdict instead
//! of an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::answer::{leading_number, normalize, text_matches, AnswerValue};
use crate::model::{Calculation, Id, Matching, MultiPart, MultipleChoice, Question, QuestionKind};
use crate::model::{ShortAnswer, SingleChoice};

/// Relative tolerance for numeric calculation answers.
pub const NUMERIC_TOLERANCE: f64 = 0.05;

const SHORT_ANSWER_CORRECT_RATIO: f64 = 0.8;
const SHORT_ANSWER_PARTIAL_RATIO: f64 = 0.5;
const BONUS_KEYWORD_WEIGHT: f64 = 0.5;
const MULTI_PART_PARTIAL_RATIO: f64 = 0.5;
const MATCHING_PARTIAL_RATIO: f64 = 0.6;

pub const MANUAL_REVIEW_MESSAGE: &str = "Answer recorded. Manual review required.";

/// Verdict category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeKind {
    Correct,
    Partial,
    Incorrect,
    Unanswered,
}

impl std::fmt::Display for GradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeKind::Correct => write!(f, "correct"),
            GradeKind::Partial => write!(f, "partial"),
            GradeKind::Incorrect => write!(f, "incorrect"),
            GradeKind::Unanswered => write!(f, "unanswered"),
        }
    }
}

/// Outcome of grading a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub kind: GradeKind,
    /// Human-readable feedback, possibly several lines.
    pub message: String,
    /// Points earned, always within `0..=points`.
    pub score: u32,
}

impl GradeResult {
    fn correct(points: u32, message: impl Into<String>) -> Self {
        Self {
            kind: GradeKind::Correct,
            message: message.into(),
            score: points,
        }
    }

    fn partial(score: u32, message: impl Into<String>) -> Self {
        Self {
            kind: GradeKind::Partial,
            message: message.into(),
            score,
        }
    }

    fn incorrect(message: impl Into<String>) -> Self {
        Self {
            kind: GradeKind::Incorrect,
            message: message.into(),
            score: 0,
        }
    }

    /// Ungradeable input: counted as partial with no points.
    pub fn manual_review() -> Self {
        Self::partial(0, MANUAL_REVIEW_MESSAGE)
    }

    pub fn unanswered() -> Self {
        Self {
            kind: GradeKind::Unanswered,
            message: "No answer provided.".into(),
            score: 0,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.kind == GradeKind::Correct
    }
}

/// Grade one answer against its question.
pub fn grade_answer(question: &Question, answer: Option<&AnswerValue>) -> GradeResult {
    let Some(answer) = answer.filter(|a| a.is_present()) else {
        return GradeResult::unanswered();
    };
    let points = question.points;

    match (&question.kind, answer) {
        (QuestionKind::SingleChoice(q), AnswerValue::Text(a)) => grade_single_choice(q, points, a),
        (QuestionKind::MultipleChoice(q), AnswerValue::Choices(a)) => {
            grade_multiple_choice(q, points, a)
        }
        (QuestionKind::Calculation(q), AnswerValue::Text(a)) => grade_calculation(q, points, a),
        (QuestionKind::ShortAnswer(q), AnswerValue::Text(a)) => grade_short_answer(q, points, a),
        (QuestionKind::MultiPart(q), AnswerValue::Mapping(a)) => grade_multi_part(q, points, a),
        (QuestionKind::Matching(q), AnswerValue::Mapping(a)) => grade_matching(q, points, a),
        // A matching answer of another shape selects nothing for any item.
        (QuestionKind::Matching(q), _) => grade_matching(q, points, &BTreeMap::new()),
        (kind, _) => {
            tracing::debug!(
                question = %question.id,
                kind = kind.type_name(),
                "falling back to manual review"
            );
            GradeResult::manual_review()
        }
    }
}

/// Exact match on the option key. No partial credit.
pub fn grade_single_choice(question: &SingleChoice, points: u32, answer: &str) -> GradeResult {
    if answer == question.correct_answer {
        GradeResult::correct(points, "Correct!")
    } else {
        GradeResult::incorrect(format!(
            "Incorrect. The correct answer is {}.",
            question.correct_answer
        ))
    }
}

/// Order-insensitive set match with proportional partial credit.
pub fn grade_multiple_choice(
    question: &MultipleChoice,
    points: u32,
    answer: &[String],
) -> GradeResult {
    let mut expected = question.correct_answers.clone();
    expected.sort();
    let mut given = answer.to_vec();
    given.sort();

    if expected == given {
        return GradeResult::correct(points, "Correct! All options identified.");
    }

    let expected_set: BTreeSet<&str> = question.correct_answers.iter().map(String::as_str).collect();
    let given_set: BTreeSet<&str> = answer.iter().map(String::as_str).collect();
    let overlap = expected_set.intersection(&given_set).count();

    if overlap == 0 {
        return GradeResult::incorrect(format!(
            "Incorrect. The correct answers are {}.",
            question.correct_answers.join(", ")
        ));
    }

    let score = proportional(points, overlap, expected_set.len());
    GradeResult::partial(
        score,
        format!(
            "Partially correct: {overlap} of {} correct options selected.",
            expected_set.len()
        ),
    )
}

/// Text match first, then numeric comparison within [`NUMERIC_TOLERANCE`].
pub fn grade_calculation(question: &Calculation, points: u32, answer: &str) -> GradeResult {
    let Some(reference) = question.expected_answers.first() else {
        return GradeResult::manual_review();
    };

    let user = normalize(answer);
    if question
        .expected_answers
        .iter()
        .any(|expected| text_matches(&user, expected))
    {
        return GradeResult::correct(points, "Correct!");
    }

    if let (Some(given), Some(expected)) = (leading_number(&user), leading_number(reference)) {
        if (given - expected).abs() <= NUMERIC_TOLERANCE * expected.abs() {
            return GradeResult::correct(points, "Correct (within tolerance).");
        }
    }

    GradeResult::incorrect(format!("Incorrect. Expected: {reference}"))
}

/// Keyword scoring: required keywords gate the verdict, bonus keywords add
/// half a point each to the raw score.
pub fn grade_short_answer(question: &ShortAnswer, points: u32, answer: &str) -> GradeResult {
    let Some(keywords) = &question.keywords else {
        return GradeResult::manual_review();
    };

    let text = normalize(answer);
    let mut raw_score = 0.0;
    let mut matched_required = 0usize;
    let mut feedback = Vec::new();

    for keyword in &keywords.required {
        if text.contains(&keyword.to_lowercase()) {
            raw_score += 1.0;
            matched_required += 1;
            feedback.push(format!("Good: mentioned {keyword}"));
        } else {
            feedback.push(format!("Missing: {keyword}"));
        }
    }

    for keyword in &keywords.bonus {
        if text.contains(&keyword.to_lowercase()) {
            raw_score += BONUS_KEYWORD_WEIGHT;
            feedback.push(format!("Good: mentioned {keyword}"));
        }
    }

    let total_required = keywords.required.len();
    let max_raw = total_required as f64 + BONUS_KEYWORD_WEIGHT * keywords.bonus.len() as f64;
    let required_ratio = if total_required == 0 {
        0.0
    } else {
        matched_required as f64 / total_required as f64
    };
    let score = if max_raw > 0.0 {
        ((points as f64 * raw_score / max_raw).floor() as u32).min(points)
    } else {
        0
    };

    let (kind, headline, score) = if required_ratio >= SHORT_ANSWER_CORRECT_RATIO {
        (GradeKind::Correct, "Correct!", score)
    } else if required_ratio >= SHORT_ANSWER_PARTIAL_RATIO {
        (GradeKind::Partial, "Partially correct.", score)
    } else {
        (GradeKind::Incorrect, "Incorrect.", 0)
    };

    GradeResult {
        kind,
        message: with_feedback(headline, &feedback),
        score,
    }
}

/// Each expected part is checked with the calculation text rule; unanswered
/// parts count against the ratio.
pub fn grade_multi_part(
    question: &MultiPart,
    points: u32,
    answer: &BTreeMap<Id, String>,
) -> GradeResult {
    let Some(expected) = question.expected_answers.as_ref().filter(|e| !e.is_empty()) else {
        return GradeResult::manual_review();
    };

    let total_parts = expected.len();
    let mut correct_parts = 0usize;
    let mut feedback = Vec::new();

    for (part, accepted) in expected {
        match answer.get(part).filter(|a| !a.trim().is_empty()) {
            Some(given) => {
                let user = normalize(given);
                if accepted.iter().any(|a| text_matches(&user, a)) {
                    correct_parts += 1;
                    feedback.push(format!("Part {part}: correct"));
                } else {
                    feedback.push(format!("Part {part}: incorrect"));
                }
            }
            None => feedback.push(format!("Part {part}: not answered")),
        }
    }

    let ratio = correct_parts as f64 / total_parts as f64;
    let summary = format!("{correct_parts} of {total_parts} parts correct.");

    if correct_parts == total_parts {
        GradeResult::correct(points, with_feedback(&summary, &feedback))
    } else if ratio >= MULTI_PART_PARTIAL_RATIO {
        GradeResult::partial(
            proportional(points, correct_parts, total_parts),
            with_feedback(&summary, &feedback),
        )
    } else {
        GradeResult::incorrect(with_feedback(&summary, &feedback))
    }
}

/// Exact per-item comparison; full points only when every item matches.
pub fn grade_matching(
    question: &Matching,
    points: u32,
    answer: &BTreeMap<Id, String>,
) -> GradeResult {
    if question.items.is_empty() {
        return GradeResult::manual_review();
    }

    let total_items = question.items.len();
    let correct_items = question
        .items
        .iter()
        .filter(|item| answer.get(&item.id) == Some(&item.correct_answer))
        .count();
    let ratio = correct_items as f64 / total_items as f64;
    let summary = format!("{correct_items} of {total_items} matches correct.");

    if correct_items == total_items {
        GradeResult::correct(points, summary)
    } else if ratio >= MATCHING_PARTIAL_RATIO {
        GradeResult::partial(proportional(points, correct_items, total_items), summary)
    } else {
        GradeResult::incorrect(summary)
    }
}

/// `floor(points * numerator / denominator)` without going through floats.
fn proportional(points: u32, numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let score = points as u64 * numerator as u64 / denominator as u64;
    score.min(points as u64) as u32
}

fn with_feedback(headline: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        return headline.to_string();
    }
    format!("{headline}\n{}", lines.join("\n"))
}
