//! # QuizQuest Progression
//!
//! Progression systems for QuizQuest.
//!
//! This crate provides the state-transition layer behind the app's
//! request handlers:
//! - The progression engine (XP accrual, level-up cascades, login streaks,
//!   quiz statistics)
//! - Shop catalog and gem-priced purchases
//! - Tasks with requirement checks and reward grants
//! - Achievement unlock scans
//! - Leaderboard ranking
//! - A revisioned storage boundary for the load-mutate-save cycle

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod achievements;
pub mod engine;
pub mod leaderboard;
pub mod progress;
pub mod shop;
pub mod stats;
pub mod store;
pub mod tasks;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::achievements::*;
    pub use crate::engine::*;
    pub use crate::leaderboard::*;
    pub use crate::progress::*;
    pub use crate::shop::*;
    pub use crate::stats::*;
    pub use crate::store::*;
    pub use crate::tasks::*;
}

pub use prelude::*;
