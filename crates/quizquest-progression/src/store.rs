//! Persistence seam for progression state.
//!
//! The engine mutates a freshly loaded, exclusively held [`UserProgress`];
//! this module defines the boundary that guarantees it. A store hands out
//! revisioned snapshots and rejects writes whose revision is stale
//! (optimistic concurrency), so two concurrent load-mutate-save cycles
//! against the same user cannot silently lose one of the writes. Retry
//! policy lives here, around the store, never inside the engine.

use crate::progress::UserProgress;
use quizquest_common::{SchemaVersion, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Retries attempted by [`ProgressStore::update`] before giving up.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No progress recorded for the user
    #[error("User not found: {0:?}")]
    UserNotFound(UserId),
    /// Progress already recorded for the user
    #[error("User already exists: {0:?}")]
    UserAlreadyExists(UserId),
    /// The snapshot was modified since it was loaded
    #[error("Version conflict: submitted revision {submitted}, store has {current}")]
    VersionConflict {
        /// Revision the write was based on
        submitted: u64,
        /// Revision currently in the store
        current: u64,
    },
    /// The stored snapshot uses an unreadable schema
    #[error("Incompatible snapshot schema: {0}")]
    IncompatibleSchema(SchemaVersion),
    /// Conflicts persisted across every retry
    #[error("Update abandoned after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A progress snapshot with its storage revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Revision the snapshot was read at.
    pub revision: u64,
    /// Schema the snapshot was written with.
    pub schema: SchemaVersion,
    /// The progress state.
    pub progress: UserProgress,
}

impl Snapshot {
    /// Wraps fresh state at revision 0 with the current schema.
    #[must_use]
    pub fn new(progress: UserProgress) -> Self {
        Self {
            revision: 0,
            schema: SchemaVersion::PROGRESS_SNAPSHOT,
            progress,
        }
    }
}

/// Storage boundary for progression state.
///
/// Implementations must make `save` fail with
/// [`StoreError::VersionConflict`] when the stored revision no longer
/// matches the snapshot's; that check is what serializes concurrent
/// read-modify-write cycles.
pub trait ProgressStore {
    /// Loads the current snapshot for a user.
    fn load(&self, user: UserId) -> StoreResult<Snapshot>;

    /// Writes a snapshot, checking its revision against the store.
    /// Returns the new revision.
    fn save(&mut self, snapshot: Snapshot) -> StoreResult<u64>;

    /// Inserts a new user's state at revision 0.
    ///
    /// Fails with [`StoreError::UserAlreadyExists`] if the user already has
    /// a snapshot; re-inserting would reset the revision and let a stale
    /// reader's write succeed against it.
    fn insert(&mut self, progress: UserProgress) -> StoreResult<()>;

    /// Runs a load-mutate-save cycle, retrying on version conflicts.
    ///
    /// The closure may run several times; it must not carry side effects
    /// beyond the state it is given. Gives up with
    /// [`StoreError::RetriesExhausted`] once the retry limit is spent.
    fn update<T>(
        &mut self,
        user: UserId,
        mut apply: impl FnMut(&mut UserProgress) -> T,
    ) -> StoreResult<T> {
        let mut attempts = 0;
        loop {
            let mut snapshot = self.load(user)?;
            let value = apply(&mut snapshot.progress);

            match self.save(snapshot) {
                Ok(_) => return Ok(value),
                Err(StoreError::VersionConflict { .. }) => {
                    attempts += 1;
                    debug!(user = user.raw(), attempts, "version conflict, retrying");
                    if attempts >= DEFAULT_RETRY_LIMIT {
                        return Err(StoreError::RetriesExhausted { attempts });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: HashMap<UserId, Snapshot>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Checks if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, user: UserId) -> StoreResult<Snapshot> {
        let snapshot = self
            .snapshots
            .get(&user)
            .ok_or(StoreError::UserNotFound(user))?;
        if !SchemaVersion::PROGRESS_SNAPSHOT.can_read(&snapshot.schema) {
            return Err(StoreError::IncompatibleSchema(snapshot.schema));
        }
        Ok(snapshot.clone())
    }

    fn save(&mut self, mut snapshot: Snapshot) -> StoreResult<u64> {
        let user = snapshot.progress.user;
        let current = self
            .snapshots
            .get(&user)
            .ok_or(StoreError::UserNotFound(user))?;

        if current.revision != snapshot.revision {
            return Err(StoreError::VersionConflict {
                submitted: snapshot.revision,
                current: current.revision,
            });
        }

        snapshot.revision += 1;
        let revision = snapshot.revision;
        self.snapshots.insert(user, snapshot);
        Ok(revision)
    }

    fn insert(&mut self, progress: UserProgress) -> StoreResult<()> {
        let user = progress.user;
        if self.snapshots.contains_key(&user) {
            return Err(StoreError::UserAlreadyExists(user));
        }
        self.snapshots.insert(user, Snapshot::new(progress));
        Ok(())
    }
}
