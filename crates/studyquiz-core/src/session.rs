//! Quiz session context.
//!
//! Holds the loaded quiz, the learner's answers and the start time for one
//! attempt, and is passed explicitly to everything that grades or scores it.

use chrono::{DateTime, Utc};

use crate::answer::{is_present, AnswerSheet, AnswerValue};
use crate::error::SessionError;
use crate::grading::{grade_answer, GradeResult};
use crate::model::{Id, Question, Quiz};
use crate::scoring::{score_quiz_at, QuizResult};

/// Answered / not answered status of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question_id: Id,
    pub answered: bool,
}

/// One attempt at a quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    answers: AnswerSheet,
    started_at: DateTime<Utc>,
    submitted: bool,
}

impl QuizSession {
    /// Start a session now.
    pub fn start(quiz: Quiz) -> Self {
        Self::started_at(quiz, Utc::now())
    }

    /// Start a session with an explicit start time.
    pub fn started_at(quiz: Quiz, started_at: DateTime<Utc>) -> Self {
        tracing::debug!(quiz = %quiz.id, questions = quiz.questions.len(), "session started");
        Self {
            quiz,
            answers: AnswerSheet::new(),
            started_at,
            submitted: false,
        }
    }

    /// Resume with answers collected elsewhere.
    pub fn with_answers(mut self, answers: AnswerSheet) -> Self {
        self.answers = answers;
        self
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn open_question(&self, id: &Id) -> Result<&Question, SessionError> {
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        self.quiz
            .question(id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))
    }

    /// Store or overwrite an answer. An empty answer clears the question.
    pub fn record_answer(&mut self, id: &Id, answer: AnswerValue) -> Result<(), SessionError> {
        let question = self.open_question(id)?;
        if !question.kind.accepts(&answer) {
            return Err(SessionError::AnswerShapeMismatch {
                question: id.clone(),
                kind: question.kind.label(),
            });
        }

        if answer.is_present() {
            self.answers.set(id.clone(), answer);
        } else {
            self.answers.clear(id);
        }
        Ok(())
    }

    /// Set one part of a multi-part answer or one item of a matching answer.
    pub fn record_entry(&mut self, id: &Id, key: Id, value: String) -> Result<(), SessionError> {
        let question = self.open_question(id)?;
        let probe = AnswerValue::Mapping(Default::default());
        if !question.kind.accepts(&probe) {
            return Err(SessionError::AnswerShapeMismatch {
                question: id.clone(),
                kind: question.kind.label(),
            });
        }
        self.answers.set_entry(id.clone(), key, value);
        Ok(())
    }

    pub fn clear_answer(&mut self, id: &Id) -> Result<(), SessionError> {
        self.open_question(id)?;
        self.answers.clear(id);
        Ok(())
    }

    /// Instant feedback for one question.
    pub fn feedback(&self, id: &Id) -> Result<GradeResult, SessionError> {
        let question = self
            .quiz
            .question(id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))?;
        Ok(grade_answer(question, self.answers.get(id)))
    }

    /// Answered status for every question, in quiz order.
    pub fn review(&self) -> Vec<ReviewEntry> {
        self.quiz
            .questions
            .iter()
            .map(|q| ReviewEntry {
                question_id: q.id.clone(),
                answered: is_present(self.answers.get(&q.id)),
            })
            .collect()
    }

    pub fn answered_count(&self) -> usize {
        self.review().iter().filter(|e| e.answered).count()
    }

    /// Score the attempt now and close the session.
    pub fn submit(&mut self) -> Result<QuizResult, SessionError> {
        self.submit_at(Utc::now())
    }

    /// Score the attempt at an explicit time and close the session.
    pub fn submit_at(&mut self, completed_at: DateTime<Utc>) -> Result<QuizResult, SessionError> {
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        let elapsed_ms = (completed_at - self.started_at).num_milliseconds().max(0);
        let elapsed_secs = ((elapsed_ms as f64) / 1000.0).round() as u64;

        let result = score_quiz_at(&self.quiz, &self.answers, elapsed_secs, completed_at);
        self.submitted = true;
        tracing::info!(
            quiz = %self.quiz.id,
            score = result.score,
            elapsed_secs,
            "quiz submitted"
        );
        Ok(result)
    }
}
