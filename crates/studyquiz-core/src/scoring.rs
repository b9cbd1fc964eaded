//! Whole-quiz scoring and the results summary.
//!
//! [`score_quiz`] uses a simpler correctness rule than
//! [`grade_answer`](crate::grading::grade_answer): only single and multiple
//! choice questions are checked; every other answered question earns full
//! points. Both behaviours are kept as they are.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answer::{AnswerSheet, AnswerValue};
use crate::model::{Id, Question, QuestionKind, Quiz};

/// Final status of one question in a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// Per-question line of a [`QuizResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: Id,
    /// Prompt text.
    pub question: String,
    pub user_answer: Option<AnswerValue>,
    /// Reference answer rendered for display.
    pub correct_answer: String,
    pub is_correct: bool,
    pub points_earned: u32,
    pub total_points: u32,
    pub status: ResultStatus,
}

/// Outcome of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    pub quiz_title: String,
    /// Percentage, rounded to the nearest integer.
    pub score: u32,
    pub earned_points: u32,
    pub total_points: u32,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub unanswered: usize,
    /// Seconds between starting and submitting.
    pub time_spent: u64,
    pub completed_at: DateTime<Utc>,
    pub detailed_results: Vec<QuestionResult>,
}

impl QuizResult {
    pub fn tier(&self) -> PerformanceTier {
        PerformanceTier::from_score(self.score)
    }

    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: QuizResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }
}

/// Score band used for the encouragement message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    Good,
    KeepStudying,
    NeedsWork,
}

impl PerformanceTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => PerformanceTier::Excellent,
            70..=89 => PerformanceTier::Good,
            50..=69 => PerformanceTier::KeepStudying,
            _ => PerformanceTier::NeedsWork,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent work! You have mastered these concepts!",
            PerformanceTier::Good => {
                "Good job! You have a solid understanding with room for improvement."
            }
            PerformanceTier::KeepStudying => {
                "Keep studying! You're on the right track but need more practice."
            }
            PerformanceTier::NeedsWork => {
                "Don't give up! Review the material and try again. You can do this!"
            }
        }
    }

    /// Style class for rendered reports.
    pub fn css_class(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "success",
            PerformanceTier::Good => "good",
            PerformanceTier::KeepStudying | PerformanceTier::NeedsWork => "needs-work",
        }
    }
}

/// Correctness rule used for final scoring.
///
/// Single choice is an exact match and multiple choice an order-insensitive
/// match. Every other kind is counted as correct.
pub fn is_answer_correct(question: &Question, answer: &AnswerValue) -> bool {
    match &question.kind {
        QuestionKind::SingleChoice(q) => {
            matches!(answer, AnswerValue::Text(a) if *a == q.correct_answer)
        }
        QuestionKind::MultipleChoice(q) => {
            let mut expected = q.correct_answers.clone();
            expected.sort();
            let mut given = match answer {
                AnswerValue::Choices(c) => c.clone(),
                _ => Vec::new(),
            };
            given.sort();
            expected == given
        }
        _ => true,
    }
}

/// Rounded percentage, 0 for an empty quiz.
pub fn percentage(earned: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * earned as f64 / total as f64).round() as u32
}

/// Score a finished attempt, stamped with the current time.
pub fn score_quiz(quiz: &Quiz, answers: &AnswerSheet, elapsed_secs: u64) -> QuizResult {
    score_quiz_at(quiz, answers, elapsed_secs, Utc::now())
}

/// Score a finished attempt with an explicit completion time.
pub fn score_quiz_at(
    quiz: &Quiz,
    answers: &AnswerSheet,
    elapsed_secs: u64,
    completed_at: DateTime<Utc>,
) -> QuizResult {
    let mut total_points = 0u32;
    let mut earned_points = 0u32;
    let mut correct_answers = 0usize;
    let mut incorrect_answers = 0usize;
    let mut unanswered = 0usize;

    let detailed_results = quiz
        .questions
        .iter()
        .map(|question| {
            total_points += question.points;
            let correct_answer = question.kind.reference_answer();

            let Some(answer) = answers.get(&question.id).filter(|a| a.is_present()) else {
                unanswered += 1;
                return QuestionResult {
                    question_id: question.id.clone(),
                    question: question.question.clone(),
                    user_answer: None,
                    correct_answer,
                    is_correct: false,
                    points_earned: 0,
                    total_points: question.points,
                    status: ResultStatus::Unanswered,
                };
            };

            let is_correct = is_answer_correct(question, answer);
            let points_earned = if is_correct {
                correct_answers += 1;
                earned_points += question.points;
                question.points
            } else {
                incorrect_answers += 1;
                0
            };

            QuestionResult {
                question_id: question.id.clone(),
                question: question.question.clone(),
                user_answer: Some(answer.clone()),
                correct_answer,
                is_correct,
                points_earned,
                total_points: question.points,
                status: if is_correct {
                    ResultStatus::Correct
                } else {
                    ResultStatus::Incorrect
                },
            }
        })
        .collect();

    let score = percentage(earned_points, total_points);
    tracing::debug!(
        quiz = %quiz.id,
        score,
        earned_points,
        total_points,
        "scored quiz attempt"
    );

    QuizResult {
        quiz_id: quiz.id.clone(),
        quiz_title: quiz.title.clone(),
        score,
        earned_points,
        total_points,
        correct_answers,
        incorrect_answers,
        unanswered,
        time_spent: elapsed_secs,
        completed_at,
        detailed_results,
    }
}
