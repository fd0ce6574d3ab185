//! The progression engine.
//!
//! Pure state-transition logic over [`UserProgress`]: XP accrual with
//! level-up cascades, login streak tracking, and quiz completion recording.
//! The engine performs no I/O and no locking; callers load a fresh,
//! exclusively-held state, invoke one operation, and persist the result.

use crate::progress::UserProgress;
use crate::stats::CategoryStat;
use chrono::{DateTime, Utc};
use quizquest_common::CategoryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Base gem reward for a level-up; the per-level bonus is added on top.
const LEVEL_UP_GEMS_BASE: u32 = 50;

/// Per-level gem bonus multiplier for a level-up.
const LEVEL_UP_GEMS_PER_LEVEL: u32 = 5;

/// Hearts granted per level-up.
const LEVEL_UP_HEARTS: u32 = 2;

/// Seconds in a calendar day, for streak gap math.
const SECONDS_PER_DAY: i64 = 86_400;

/// Progression error types.
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// XP grants must be positive
    #[error("Invalid XP amount: grants must be positive")]
    InvalidXpAmount,
    /// XP grant would overflow the per-level accumulator
    #[error("XP amount {amount} overflows level progress {current}")]
    XpOverflow {
        /// XP already accumulated toward the next level
        current: u32,
        /// Amount that was rejected
        amount: u32,
    },
}

/// Result type for progression operations.
pub type ProgressionResult<T> = Result<T, ProgressionError>;

/// XP required to advance from `level` to `level + 1`.
///
/// The curve is fixed; no alternate curve exists.
#[must_use]
pub const fn xp_required(level: u32) -> u32 {
    (level + 1) * 1000
}

/// Rewards granted by one engine call, summed across all level-ups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// Gems granted.
    pub gems: u32,
    /// Hearts granted.
    pub hearts: u32,
}

/// Outcome of an XP grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpResult {
    /// Whether at least one level was gained.
    pub leveled_up: bool,
    /// Level after the grant.
    pub new_level: u32,
    /// XP toward the next level after the grant.
    pub current_xp: u32,
    /// Threshold for the next level after the grant.
    pub next_level_xp: u32,
    /// Rewards granted by this call.
    pub rewards: RewardGrant,
}

/// A progression event, as delivered by the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// XP was earned.
    XpEarned {
        /// Amount earned, must be positive.
        amount: u32,
    },
    /// A login occurred.
    LoginOccurred {
        /// Login time.
        at: DateTime<Utc>,
    },
    /// A quiz was completed.
    QuizCompleted {
        /// Quiz category.
        category: CategoryId,
        /// Whether the attempt was fully correct.
        correct: bool,
        /// Time spent on the attempt.
        time_spent: u64,
    },
}

/// Outcome of applying a [`ProgressEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressOutcome {
    /// An XP grant was applied.
    Xp(LevelUpResult),
    /// A login was recorded.
    Login {
        /// Streak after the login.
        streak: u32,
    },
    /// A quiz completion was recorded.
    Quiz(CategoryStat),
}

/// The progression engine.
///
/// Stateless; all state lives in the [`UserProgress`] passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionEngine;

impl ProgressionEngine {
    /// Creates a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an XP grant, resolving every level threshold it crosses.
    ///
    /// `total_xp` always grows by exactly `amount`; `current_level_xp` is
    /// reduced by each crossed threshold (never zeroed), so
    /// `current_level_xp < next_level_xp` holds on return. Each level gained
    /// grants `50 + new_level * 5` gems and 2 hearts.
    ///
    /// A grant that would overflow the per-level accumulator is rejected
    /// whole; state is untouched on any failure.
    pub fn apply_xp(
        &self,
        progress: &mut UserProgress,
        amount: u32,
    ) -> ProgressionResult<LevelUpResult> {
        if amount == 0 {
            return Err(ProgressionError::InvalidXpAmount);
        }

        let accumulated = progress
            .current_level_xp
            .checked_add(amount)
            .ok_or(ProgressionError::XpOverflow {
                current: progress.current_level_xp,
                amount,
            })?;

        progress.total_xp += u64::from(amount);
        progress.current_level_xp = accumulated;

        let start_level = progress.level;
        let mut rewards = RewardGrant::default();
        let mut required = xp_required(progress.level);

        // A single large grant can cross several thresholds; resolve them
        // all so the state never carries a dangling overflow. Terminates
        // because `required` strictly increases each iteration.
        while progress.current_level_xp >= required {
            progress.level += 1;
            progress.current_level_xp -= required;

            let gems = LEVEL_UP_GEMS_BASE + progress.level * LEVEL_UP_GEMS_PER_LEVEL;
            progress.gems += gems;
            progress.hearts += LEVEL_UP_HEARTS;
            rewards.gems += gems;
            rewards.hearts += LEVEL_UP_HEARTS;

            debug!(
                user = progress.user.raw(),
                level = progress.level,
                gems,
                "level up"
            );

            required = xp_required(progress.level);
        }

        progress.next_level_xp = required;

        Ok(LevelUpResult {
            leveled_up: progress.level > start_level,
            new_level: progress.level,
            current_xp: progress.current_level_xp,
            next_level_xp: progress.next_level_xp,
            rewards,
        })
    }

    /// Records a login and updates the consecutive-day streak.
    ///
    /// A gap of exactly one day extends the streak, a longer gap resets it,
    /// and repeat logins on the same day leave it unchanged. A login earlier
    /// than the last recorded one (clock skew) leaves the streak unchanged
    /// and is logged. `last_login` always advances to `now`.
    ///
    /// Returns the streak after the login.
    pub fn record_login(&self, progress: &mut UserProgress, now: DateTime<Utc>) -> u32 {
        let days_since_last = (now - progress.last_login)
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY);

        match days_since_last {
            1 => progress.streak += 1,
            d if d > 1 => progress.streak = 0,
            d if d < 0 => {
                warn!(
                    user = progress.user.raw(),
                    days = d,
                    "login earlier than last recorded login; streak unchanged"
                );
            }
            _ => {} // same day
        }

        progress.last_login = now;
        progress.streak
    }

    /// Records a quiz completion against a category.
    ///
    /// An unseen category gets a fresh record. Returns the updated
    /// per-category record.
    pub fn record_quiz_completion(
        &self,
        progress: &mut UserProgress,
        category: CategoryId,
        correct: bool,
        time_spent: u64,
    ) -> CategoryStat {
        progress.stats.record_attempt(category, correct, time_spent)
    }

    /// Applies a single progression event.
    pub fn apply_event(
        &self,
        progress: &mut UserProgress,
        event: ProgressEvent,
    ) -> ProgressionResult<ProgressOutcome> {
        match event {
            ProgressEvent::XpEarned { amount } => {
                self.apply_xp(progress, amount).map(ProgressOutcome::Xp)
            }
            ProgressEvent::LoginOccurred { at } => Ok(ProgressOutcome::Login {
                streak: self.record_login(progress, at),
            }),
            ProgressEvent::QuizCompleted {
                category,
                correct,
                time_spent,
            } => Ok(ProgressOutcome::Quiz(self.record_quiz_completion(
                progress, category, correct, time_spent,
            ))),
        }
    }
}
