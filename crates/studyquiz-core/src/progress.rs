//! Per-quiz progress tracking with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::QuizResult;

/// Progress record for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub completed: bool,
    /// Score of the latest attempt.
    pub score: u32,
    pub last_attempted: DateTime<Utc>,
    pub attempts: u32,
    pub best_score: u32,
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_quizzes: usize,
    pub completed_quizzes: usize,
    /// Mean latest score over completed quizzes, rounded.
    pub average_score: u32,
}

/// Progress for every attempted quiz, keyed by quiz id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    entries: BTreeMap<String, QuizProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, quiz_id: &str) -> Option<&QuizProgress> {
        self.entries.get(quiz_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a finished attempt.
    pub fn record(&mut self, result: &QuizResult) -> &QuizProgress {
        let previous = self.entries.get(&result.quiz_id);
        let attempts = previous.map_or(0, |p| p.attempts) + 1;
        let best_score = previous.map_or(0, |p| p.best_score).max(result.score);

        tracing::info!(
            quiz = %result.quiz_id,
            score = result.score,
            attempts,
            best_score,
            "recorded quiz attempt"
        );

        self.entries.insert(
            result.quiz_id.clone(),
            QuizProgress {
                completed: true,
                score: result.score,
                last_attempted: result.completed_at,
                attempts,
                best_score,
            },
        );
        &self.entries[&result.quiz_id]
    }

    /// Dashboard numbers given the number of available quizzes.
    pub fn stats(&self, total_quizzes: usize) -> ProgressStats {
        let scores: Vec<u32> = self
            .entries
            .values()
            .filter(|p| p.completed)
            .map(|p| p.score)
            .collect();
        let average_score = if scores.is_empty() {
            0
        } else {
            let sum: u64 = scores.iter().map(|&s| s as u64).sum();
            (sum as f64 / scores.len() as f64).round() as u32
        };

        ProgressStats {
            total_quizzes,
            completed_quizzes: scores.len(),
            average_score,
        }
    }

    /// Most recently attempted quizzes, newest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<(&str, &QuizProgress)> {
        let mut recent: Vec<(&str, &QuizProgress)> = self
            .entries
            .iter()
            .map(|(id, p)| (id.as_str(), p))
            .collect();
        recent.sort_by(|a, b| b.1.last_attempted.cmp(&a.1.last_attempted));
        recent.truncate(limit);
        recent
    }

    /// Load the store, or start empty when the file does not exist yet.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read progress from {}", path.display()))?;
        let store: ProgressStore = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse progress JSON: {}", path.display()))?;
        Ok(store)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize progress")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write progress to {}", path.display()))?;
        Ok(())
    }
}
