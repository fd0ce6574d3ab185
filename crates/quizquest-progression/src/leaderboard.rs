//! Leaderboard ranking over progression snapshots.
//!
//! Pure computation: the caller loads whatever rows it wants ranked (all
//! users, friends, a category cohort) and gets back an ordered board plus
//! summary figures for the leaderboard page header.

use crate::progress::UserProgress;
use quizquest_common::UserId;
use serde::{Deserialize, Serialize};

/// Default board size, matching the leaderboard page.
pub const DEFAULT_BOARD_SIZE: usize = 100;

/// One user's entry, as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// User identifier.
    pub user: UserId,
    /// Display name.
    pub username: String,
    /// Current level.
    pub level: u32,
    /// Lifetime XP.
    pub total_xp: u64,
    /// Current login streak.
    pub streak: u32,
}

impl LeaderboardRow {
    /// Builds a row from a progression snapshot.
    #[must_use]
    pub fn from_progress(progress: &UserProgress, username: impl Into<String>) -> Self {
        Self {
            user: progress.user,
            username: username.into(),
            level: progress.level,
            total_xp: progress.total_xp,
            streak: progress.streak,
        }
    }
}

/// Summary figures shown above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSummary {
    /// Total players considered.
    pub total_players: usize,
    /// Highest streak among them.
    pub highest_streak: u32,
}

/// A ranked leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Ranked entries, best first.
    pub entries: Vec<LeaderboardRow>,
    /// Summary over all considered rows (not just the kept ones).
    pub summary: LeaderboardSummary,
}

impl Leaderboard {
    /// Ranks rows by level, then lifetime XP, both descending, keeping the
    /// top `size`. Ties beyond those keys keep their input order.
    #[must_use]
    pub fn rank(mut rows: Vec<LeaderboardRow>, size: usize) -> Self {
        let summary = LeaderboardSummary {
            total_players: rows.len(),
            highest_streak: rows.iter().map(|r| r.streak).max().unwrap_or(0),
        };

        rows.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then_with(|| b.total_xp.cmp(&a.total_xp))
        });
        rows.truncate(size);

        Self {
            entries: rows,
            summary,
        }
    }

    /// Ranks rows with the default board size.
    #[must_use]
    pub fn rank_default(rows: Vec<LeaderboardRow>) -> Self {
        Self::rank(rows, DEFAULT_BOARD_SIZE)
    }

    /// 1-based position of a user on the board, if present.
    #[must_use]
    pub fn position_of(&self, user: UserId) -> Option<usize> {
        self.entries.iter().position(|r| r.user == user).map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, level: u32, total_xp: u64, streak: u32) -> LeaderboardRow {
        LeaderboardRow {
            user: UserId::from_raw(id),
            username: format!("user{id}"),
            level,
            total_xp,
            streak,
        }
    }

    #[test]
    fn test_rank_orders_by_level_then_xp() {
        let board = Leaderboard::rank(
            vec![
                row(1, 2, 3000, 0),
                row(2, 5, 100, 3),
                row(3, 2, 9000, 1),
                row(4, 5, 20_000, 0),
            ],
            10,
        );

        let order: Vec<u64> = board.entries.iter().map(|r| r.user.raw()).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_rank_caps_board_size() {
        let rows = (1..=10).map(|i| row(i, i as u32, 0, 0)).collect();
        let board = Leaderboard::rank(rows, 3);

        assert_eq!(board.entries.len(), 3);
        // Summary still covers everyone considered.
        assert_eq!(board.summary.total_players, 10);
    }

    #[test]
    fn test_summary_highest_streak() {
        let board = Leaderboard::rank(
            vec![row(1, 1, 0, 4), row(2, 1, 0, 12), row(3, 1, 0, 0)],
            10,
        );
        assert_eq!(board.summary.highest_streak, 12);
    }

    #[test]
    fn test_empty_board() {
        let board = Leaderboard::rank(Vec::new(), 10);
        assert!(board.entries.is_empty());
        assert_eq!(board.summary, LeaderboardSummary::default());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let board = Leaderboard::rank(
            vec![row(7, 3, 500, 0), row(8, 3, 500, 0), row(9, 3, 500, 0)],
            10,
        );
        let order: Vec<u64> = board.entries.iter().map(|r| r.user.raw()).collect();
        assert_eq!(order, vec![7, 8, 9]);
    }

    #[test]
    fn test_position_of() {
        let board = Leaderboard::rank(vec![row(1, 1, 0, 0), row(2, 9, 0, 0)], 10);
        assert_eq!(board.position_of(UserId::from_raw(2)), Some(1));
        assert_eq!(board.position_of(UserId::from_raw(1)), Some(2));
        assert_eq!(board.position_of(UserId::from_raw(3)), None);
    }
}
