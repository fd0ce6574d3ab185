//! Achievement definitions and unlock tracking.
//!
//! Achievements are threshold milestones over a user's progression
//! counters. Each definition unlocks at most once per user; unlocks are
//! recorded on [`UserProgress`] with their unlock time.

use crate::progress::UserProgress;
use chrono::{DateTime, Utc};
use quizquest_common::CategoryId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The milestones the app awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Quizzes completed in total.
    QuizMaster,
    /// Login streak length.
    StreakChampion,
    /// Correct answers within one category.
    CategoryExpert,
}

impl AchievementKind {
    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::QuizMaster => "Quiz Master",
            Self::StreakChampion => "Streak Champion",
            Self::CategoryExpert => "Category Expert",
        }
    }
}

/// An achievement definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDef {
    /// Milestone kind.
    pub kind: AchievementKind,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Counter value at which the achievement unlocks.
    pub threshold: u32,
    /// Target category, for `CategoryExpert` milestones.
    pub category: Option<CategoryId>,
}

impl AchievementDef {
    /// Creates a new definition.
    #[must_use]
    pub fn new(kind: AchievementKind, name: impl Into<String>, threshold: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            threshold,
            category: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Targets a category (for `CategoryExpert`).
    #[must_use]
    pub fn for_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// The counter this definition measures, read from a user's progress.
    #[must_use]
    pub fn measured_value(&self, progress: &UserProgress) -> u32 {
        match self.kind {
            AchievementKind::QuizMaster => progress.stats.total_quizzes,
            AchievementKind::StreakChampion => progress.streak,
            AchievementKind::CategoryExpert => self
                .category
                .map_or(0, |c| progress.stats.correct_in_category(c)),
        }
    }

    /// Checks whether a user has already unlocked this definition.
    #[must_use]
    pub fn is_unlocked_by(&self, progress: &UserProgress) -> bool {
        progress.achievements.iter().any(|a| {
            a.kind == self.kind && a.threshold == self.threshold && a.category == self.category
        })
    }
}

/// A recorded unlock, stored on [`UserProgress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    /// Milestone kind.
    pub kind: AchievementKind,
    /// Name of the definition at unlock time.
    pub name: String,
    /// Threshold that was reached.
    pub threshold: u32,
    /// Target category, if any.
    pub category: Option<CategoryId>,
    /// When the unlock happened.
    pub unlocked_at: DateTime<Utc>,
}

/// The authored achievement definitions plus the unlock scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementSet {
    /// All definitions.
    defs: Vec<AchievementDef>,
}

impl AchievementSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition.
    pub fn add(&mut self, def: AchievementDef) {
        self.defs.push(def);
    }

    /// Returns all definitions.
    #[must_use]
    pub fn defs(&self) -> &[AchievementDef] {
        &self.defs
    }

    /// Scans for definitions whose threshold the user has reached and
    /// records the new unlocks.
    ///
    /// Idempotent per definition: a second scan with the same progress
    /// returns nothing new.
    pub fn check_unlocks(
        &self,
        progress: &mut UserProgress,
        at: DateTime<Utc>,
    ) -> Vec<UnlockedAchievement> {
        let mut unlocked = Vec::new();

        for def in &self.defs {
            if def.is_unlocked_by(progress) {
                continue;
            }
            if def.measured_value(progress) < def.threshold {
                continue;
            }

            let unlock = UnlockedAchievement {
                kind: def.kind,
                name: def.name.clone(),
                threshold: def.threshold,
                category: def.category,
                unlocked_at: at,
            };
            debug!(
                user = progress.user.raw(),
                achievement = def.name.as_str(),
                "achievement unlocked"
            );
            progress.achievements.push(unlock.clone());
            unlocked.push(unlock);
        }

        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProgressionEngine;
    use chrono::TimeZone;
    use quizquest_common::UserId;

    fn unlock_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid time")
    }

    fn fresh_progress() -> UserProgress {
        UserProgress::new(UserId::from_raw(1), unlock_time())
    }

    fn sample_set() -> AchievementSet {
        let mut set = AchievementSet::new();
        set.add(
            AchievementDef::new(AchievementKind::QuizMaster, "Getting started", 3)
                .with_description("Complete 3 quizzes"),
        );
        set.add(AchievementDef::new(
            AchievementKind::StreakChampion,
            "One week strong",
            7,
        ));
        set.add(
            AchievementDef::new(AchievementKind::CategoryExpert, "History buff", 2)
                .for_category(CategoryId::new(5)),
        );
        set
    }

    #[test]
    fn test_unlock_fires_once() {
        let engine = ProgressionEngine::new();
        let set = sample_set();
        let mut progress = fresh_progress();

        for _ in 0..3 {
            engine.record_quiz_completion(&mut progress, CategoryId::new(1), true, 10);
        }

        let unlocked = set.check_unlocks(&mut progress, unlock_time());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].kind, AchievementKind::QuizMaster);

        // Same state, no new unlocks.
        let again = set.check_unlocks(&mut progress, unlock_time());
        assert!(again.is_empty());
        assert_eq!(progress.achievements.len(), 1);
    }

    #[test]
    fn test_below_threshold_does_not_unlock() {
        let engine = ProgressionEngine::new();
        let set = sample_set();
        let mut progress = fresh_progress();

        engine.record_quiz_completion(&mut progress, CategoryId::new(1), true, 10);
        let unlocked = set.check_unlocks(&mut progress, unlock_time());
        assert!(unlocked.is_empty());
    }

    #[test]
    fn test_category_expert_counts_correct_in_category() {
        let engine = ProgressionEngine::new();
        let set = sample_set();
        let mut progress = fresh_progress();
        let history = CategoryId::new(5);

        // Wrong answers and other categories do not count.
        engine.record_quiz_completion(&mut progress, history, false, 10);
        engine.record_quiz_completion(&mut progress, CategoryId::new(1), true, 10);
        engine.record_quiz_completion(&mut progress, history, true, 10);
        assert!(set.check_unlocks(&mut progress, unlock_time()).is_empty());

        engine.record_quiz_completion(&mut progress, history, true, 10);
        let unlocked = set.check_unlocks(&mut progress, unlock_time());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].kind, AchievementKind::CategoryExpert);
    }

    #[test]
    fn test_streak_champion() {
        let set = sample_set();
        let mut progress = fresh_progress();
        progress.streak = 7;

        let unlocked = set.check_unlocks(&mut progress, unlock_time());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].name, "One week strong");
        assert_eq!(unlocked[0].unlocked_at, unlock_time());
    }

    #[test]
    fn test_multiple_unlocks_in_one_scan() {
        let engine = ProgressionEngine::new();
        let set = sample_set();
        let mut progress = fresh_progress();
        progress.streak = 10;
        for _ in 0..3 {
            engine.record_quiz_completion(&mut progress, CategoryId::new(1), true, 10);
        }

        let unlocked = set.check_unlocks(&mut progress, unlock_time());
        assert_eq!(unlocked.len(), 2);
    }
}
