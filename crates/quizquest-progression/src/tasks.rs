//! Task system: definitions, requirement checks, and reward grants.
//!
//! Tasks are authored content (daily goals, specials) with a requirement
//! evaluated against [`UserProgress`] and a reward granted once on
//! completion. XP rewards route through the engine so level-up cascades
//! apply.

use crate::engine::{LevelUpResult, ProgressionEngine};
use crate::progress::UserProgress;
use chrono::{DateTime, Utc};
use quizquest_common::{CategoryId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Task error types.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task not found
    #[error("Task not found: {0:?}")]
    TaskNotFound(TaskId),
    /// Task exists but is not active
    #[error("Task is inactive: {0:?}")]
    TaskInactive(TaskId),
    /// Task was already completed by this user
    #[error("Task already completed: {0:?}")]
    AlreadyCompleted(TaskId),
    /// The user's progress does not meet the requirement
    #[error("Task requirement not met: {0:?}")]
    RequirementNotMet(TaskId),
}

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Task category, for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Resets daily (rotation handled by content authoring).
    Daily,
    /// Long-running accomplishment.
    Achievement,
    /// Limited-time special.
    Special,
}

/// What a user must have done for a task to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// Complete at least `count` quizzes in total.
    QuizComplete {
        /// Required quiz count.
        count: u32,
    },
    /// Answer at least `count` quizzes fully correctly.
    CorrectAnswers {
        /// Required correct count.
        count: u32,
    },
    /// Reach a login streak of at least `count` days.
    Streak {
        /// Required streak length.
        count: u32,
    },
    /// Complete at least `count` quizzes in one category.
    CategoryComplete {
        /// Target category.
        category: CategoryId,
        /// Required quiz count.
        count: u32,
    },
}

impl Requirement {
    /// Checks the requirement against a user's progress.
    #[must_use]
    pub fn is_met(&self, progress: &UserProgress) -> bool {
        match *self {
            Self::QuizComplete { count } => progress.stats.total_quizzes >= count,
            Self::CorrectAnswers { count } => progress.stats.correct_answers >= count,
            Self::Streak { count } => progress.streak >= count,
            Self::CategoryComplete { category, count } => {
                progress.stats.category(category).map_or(0, |s| s.completed) >= count
            }
        }
    }
}

/// Reward granted on task completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReward {
    /// XP granted (routed through the engine).
    pub xp: u32,
    /// Gems granted.
    pub gems: u32,
    /// Hearts granted.
    pub hearts: u32,
}

/// An authored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    /// Task identifier.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Grouping kind.
    pub kind: TaskKind,
    /// Completion requirement.
    pub requirement: Requirement,
    /// Reward granted on completion.
    pub reward: TaskReward,
    /// Whether the task can currently be completed.
    pub active: bool,
}

impl TaskDef {
    /// Creates a new active task.
    #[must_use]
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        kind: TaskKind,
        requirement: Requirement,
        reward: TaskReward,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            kind,
            requirement,
            reward,
            active: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the task inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Outcome of a successful task completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    /// Completed task.
    pub task: TaskId,
    /// Reward granted.
    pub reward: TaskReward,
    /// Result of the XP grant, if the reward carried XP.
    pub level_up: Option<LevelUpResult>,
}

/// The set of authored tasks plus the completion operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBook {
    /// Tasks by ID.
    tasks: HashMap<TaskId, TaskDef>,
}

impl TaskBook {
    /// Creates an empty task book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a task.
    pub fn stock(&mut self, task: TaskDef) {
        self.tasks.insert(task.id, task);
    }

    /// Gets a task by ID.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&TaskDef> {
        self.tasks.get(&id)
    }

    /// Returns the number of authored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Checks if the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Lists active tasks with each one's completion flag for a user,
    /// as shown on the tasks page.
    pub fn overview<'a>(
        &'a self,
        progress: &'a UserProgress,
    ) -> impl Iterator<Item = (&'a TaskDef, bool)> {
        self.tasks
            .values()
            .filter(|t| t.active)
            .map(|t| (t, progress.has_completed(t.id)))
    }

    /// Completes a task for a user and grants its reward.
    ///
    /// Fails if the task is unknown, inactive, already completed, or its
    /// requirement is not met; state is untouched on failure. The XP part
    /// of the reward goes through [`ProgressionEngine::apply_xp`], so a
    /// reward can cascade into level-ups.
    pub fn complete(
        &self,
        engine: &ProgressionEngine,
        progress: &mut UserProgress,
        id: TaskId,
        at: DateTime<Utc>,
    ) -> TaskResult<TaskCompletion> {
        let task = self.tasks.get(&id).ok_or(TaskError::TaskNotFound(id))?;
        if !task.active {
            return Err(TaskError::TaskInactive(id));
        }
        if progress.has_completed(id) {
            return Err(TaskError::AlreadyCompleted(id));
        }
        if !task.requirement.is_met(progress) {
            return Err(TaskError::RequirementNotMet(id));
        }

        progress.completed_tasks.insert(id, at);
        progress.gems += task.reward.gems;
        progress.hearts += task.reward.hearts;

        // A zero-XP reward skips the engine, which rejects zero grants.
        let level_up = if task.reward.xp > 0 {
            engine.apply_xp(progress, task.reward.xp).ok()
        } else {
            None
        };

        debug!(
            user = progress.user.raw(),
            task = id.raw(),
            xp = task.reward.xp,
            "task completed"
        );

        Ok(TaskCompletion {
            task: id,
            reward: task.reward,
            level_up,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quizquest_common::UserId;

    fn completion_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid time")
    }

    fn fresh_progress() -> UserProgress {
        UserProgress::new(UserId::from_raw(1), completion_time())
    }

    fn sample_book() -> TaskBook {
        let mut book = TaskBook::new();
        book.stock(
            TaskDef::new(
                TaskId::new(1),
                "First quiz",
                TaskKind::Daily,
                Requirement::QuizComplete { count: 1 },
                TaskReward {
                    xp: 100,
                    gems: 10,
                    hearts: 1,
                },
            )
            .with_description("Complete your first quiz of the day"),
        );
        book.stock(TaskDef::new(
            TaskId::new(2),
            "Week streak",
            TaskKind::Achievement,
            Requirement::Streak { count: 7 },
            TaskReward {
                xp: 2000,
                gems: 50,
                hearts: 0,
            },
        ));
        book.stock(
            TaskDef::new(
                TaskId::new(3),
                "Retired task",
                TaskKind::Special,
                Requirement::QuizComplete { count: 1 },
                TaskReward::default(),
            )
            .inactive(),
        );
        book
    }

    fn complete_one_quiz(progress: &mut UserProgress) {
        let engine = ProgressionEngine::new();
        engine.record_quiz_completion(progress, CategoryId::new(1), true, 30);
    }

    #[test]
    fn test_complete_task_grants_rewards_once() {
        let engine = ProgressionEngine::new();
        let book = sample_book();
        let mut progress = fresh_progress();
        complete_one_quiz(&mut progress);

        let completion = book
            .complete(&engine, &mut progress, TaskId::new(1), completion_time())
            .expect("requirement met");

        assert_eq!(completion.reward.gems, 10);
        assert_eq!(progress.gems, 10);
        assert_eq!(progress.hearts, 6);
        assert_eq!(progress.total_xp, 100);
        assert!(completion.level_up.is_some());

        let second = book.complete(&engine, &mut progress, TaskId::new(1), completion_time());
        assert!(matches!(second, Err(TaskError::AlreadyCompleted(_))));
        assert_eq!(progress.gems, 10);
        assert_eq!(progress.total_xp, 100);
    }

    #[test]
    fn test_requirement_not_met() {
        let engine = ProgressionEngine::new();
        let book = sample_book();
        let mut progress = fresh_progress();

        let result = book.complete(&engine, &mut progress, TaskId::new(2), completion_time());
        assert!(matches!(result, Err(TaskError::RequirementNotMet(_))));
        assert!(!progress.has_completed(TaskId::new(2)));
    }

    #[test]
    fn test_xp_reward_cascades_into_level_up() {
        let engine = ProgressionEngine::new();
        let book = sample_book();
        let mut progress = fresh_progress();
        progress.streak = 7;

        let completion = book
            .complete(&engine, &mut progress, TaskId::new(2), completion_time())
            .expect("streak requirement met");

        let level_up = completion.level_up.expect("2000 xp crosses the level 1 threshold");
        assert!(level_up.leveled_up);
        assert_eq!(level_up.new_level, 2);
        // 50 task gems + 60 level-up gems.
        assert_eq!(progress.gems, 110);
    }

    #[test]
    fn test_unknown_and_inactive_tasks() {
        let engine = ProgressionEngine::new();
        let book = sample_book();
        let mut progress = fresh_progress();
        complete_one_quiz(&mut progress);

        let result = book.complete(&engine, &mut progress, TaskId::new(99), completion_time());
        assert!(matches!(result, Err(TaskError::TaskNotFound(_))));

        let result = book.complete(&engine, &mut progress, TaskId::new(3), completion_time());
        assert!(matches!(result, Err(TaskError::TaskInactive(_))));
    }

    #[test]
    fn test_overview_flags_completed_tasks() {
        let engine = ProgressionEngine::new();
        let book = sample_book();
        let mut progress = fresh_progress();
        complete_one_quiz(&mut progress);

        book.complete(&engine, &mut progress, TaskId::new(1), completion_time())
            .expect("requirement met");

        let overview: HashMap<TaskId, bool> = book
            .overview(&progress)
            .map(|(task, done)| (task.id, done))
            .collect();

        // Inactive task excluded from the listing.
        assert_eq!(overview.len(), 2);
        assert!(overview[&TaskId::new(1)]);
        assert!(!overview[&TaskId::new(2)]);
    }

    #[test]
    fn test_category_requirement() {
        let engine = ProgressionEngine::new();
        let cat = CategoryId::new(4);
        let requirement = Requirement::CategoryComplete { category: cat, count: 2 };
        let mut progress = fresh_progress();

        assert!(!requirement.is_met(&progress));
        engine.record_quiz_completion(&mut progress, cat, false, 10);
        assert!(!requirement.is_met(&progress));
        engine.record_quiz_completion(&mut progress, cat, true, 10);
        assert!(requirement.is_met(&progress));
    }
}
