//! # QuizQuest Common
//!
//! Common types, utilities, and shared abstractions for QuizQuest.
//!
//! This crate provides foundational types used across all QuizQuest subsystems:
//! - ID types (UserId, CategoryId, ItemId, TaskId)
//! - Version information for persisted schemas
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
