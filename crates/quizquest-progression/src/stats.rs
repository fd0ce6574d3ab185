//! Quiz performance statistics.
//!
//! This module tracks per-category performance counters alongside the
//! account-wide aggregates shown on the profile page.

use quizquest_common::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-category performance record.
///
/// The counters satisfy `completed == correct + wrong` after every update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    /// Quizzes completed in this category.
    pub completed: u32,
    /// Fully correct attempts.
    pub correct: u32,
    /// Incorrect attempts.
    pub wrong: u32,
    /// Best score observed (0-100).
    pub best_score: u32,
    /// Cumulative time spent, in the caller's time unit.
    pub total_time: u64,
}

impl CategoryStat {
    /// Records one quiz attempt.
    ///
    /// A fully correct attempt scores 100, anything else scores 0; the
    /// boolean contract comes from the quiz flow, which reports a single
    /// pass/fail signal per attempt.
    pub fn record_attempt(&mut self, correct: bool, time_spent: u64) {
        self.completed += 1;
        if correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }

        let score = if correct { 100 } else { 0 };
        self.best_score = self.best_score.max(score);
        self.total_time += time_spent;
    }

    /// Accuracy over all attempts in this category (0.0-1.0).
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        if self.completed == 0 {
            return 0.0;
        }
        self.correct as f32 / self.completed as f32
    }
}

/// Account-wide quiz statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    /// Total quizzes completed across all categories.
    pub total_quizzes: u32,
    /// Total fully correct attempts.
    pub correct_answers: u32,
    /// Total incorrect attempts.
    pub wrong_answers: u32,
    /// Per-category records, keyed by category.
    pub category_stats: HashMap<CategoryId, CategoryStat>,
}

impl QuizStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a quiz attempt, updating both aggregates and the
    /// per-category record. An unseen category gets a fresh record.
    ///
    /// Returns a copy of the updated category record.
    pub fn record_attempt(
        &mut self,
        category: CategoryId,
        correct: bool,
        time_spent: u64,
    ) -> CategoryStat {
        self.total_quizzes += 1;
        if correct {
            self.correct_answers += 1;
        } else {
            self.wrong_answers += 1;
        }

        let stat = self.category_stats.entry(category).or_default();
        stat.record_attempt(correct, time_spent);
        *stat
    }

    /// Gets the record for a category, if any attempts were made.
    #[must_use]
    pub fn category(&self, category: CategoryId) -> Option<&CategoryStat> {
        self.category_stats.get(&category)
    }

    /// Number of distinct categories attempted.
    #[must_use]
    pub fn categories_attempted(&self) -> usize {
        self.category_stats.len()
    }

    /// Best correct count across the given category, 0 if unseen.
    #[must_use]
    pub fn correct_in_category(&self, category: CategoryId) -> u32 {
        self.category(category).map_or(0, |s| s.correct)
    }
}
