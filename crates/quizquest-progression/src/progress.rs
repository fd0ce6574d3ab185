//! User progression state.
//!
//! `UserProgress` is the mutable subject of every progression operation:
//! the engine, shop, task, and achievement systems all read and write this
//! record. Persistence is the caller's concern (see [`crate::store`]).

use crate::achievements::UnlockedAchievement;
use crate::stats::QuizStats;
use chrono::{DateTime, Utc};
use quizquest_common::{ItemId, TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hearts granted at account registration.
pub const STARTING_HEARTS: u32 = 5;

/// XP threshold shown to a fresh account before its first XP grant.
pub const STARTING_NEXT_LEVEL_XP: u32 = 1000;

/// An item held in a user's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Purchased item.
    pub item: ItemId,
    /// Quantity purchased in this transaction.
    pub quantity: u32,
    /// When the purchase happened.
    pub purchased_at: DateTime<Utc>,
}

/// The complete progression state of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    /// Owning user.
    pub user: UserId,
    /// Current level, starts at 1.
    pub level: u32,
    /// Lifetime XP, never decremented.
    pub total_xp: u64,
    /// XP accumulated toward the next level.
    pub current_level_xp: u32,
    /// XP threshold required to advance from `level` to `level + 1`.
    pub next_level_xp: u32,
    /// Soft currency balance.
    pub gems: u32,
    /// Consumable resource balance.
    pub hearts: u32,
    /// Consecutive-day login counter.
    pub streak: u32,
    /// Date of last recorded login.
    pub last_login: DateTime<Utc>,
    /// Quiz performance statistics.
    pub stats: QuizStats,
    /// Purchased shop items.
    pub inventory: Vec<InventoryEntry>,
    /// Completed tasks with completion times.
    pub completed_tasks: HashMap<TaskId, DateTime<Utc>>,
    /// Unlocked achievements.
    pub achievements: Vec<UnlockedAchievement>,
}

impl UserProgress {
    /// Creates the registration-default state for a new account.
    #[must_use]
    pub fn new(user: UserId, registered_at: DateTime<Utc>) -> Self {
        Self {
            user,
            level: 1,
            total_xp: 0,
            current_level_xp: 0,
            next_level_xp: STARTING_NEXT_LEVEL_XP,
            gems: 0,
            hearts: STARTING_HEARTS,
            streak: 0,
            last_login: registered_at,
            stats: QuizStats::new(),
            inventory: Vec::new(),
            completed_tasks: HashMap::new(),
            achievements: Vec::new(),
        }
    }

    /// Checks if a task was already completed.
    #[must_use]
    pub fn has_completed(&self, task: TaskId) -> bool {
        self.completed_tasks.contains_key(&task)
    }

    /// Records a purchase in the inventory.
    pub fn add_to_inventory(&mut self, item: ItemId, quantity: u32, at: DateTime<Utc>) {
        self.inventory.push(InventoryEntry {
            item,
            quantity,
            purchased_at: at,
        });
    }
}
