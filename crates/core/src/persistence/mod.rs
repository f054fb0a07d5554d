//! Durable storage for [`HuntProgress`].
//!
//! Stores are advisory: the session logs failures and keeps playing from
//! memory, so an implementation should never panic on I/O trouble.

pub mod sqlite;

use std::sync::{Arc, Mutex, PoisonError};

use crate::hunt::HuntProgress;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

pub trait ProgressStore: Send {
    /// `None` means nothing has been saved yet; callers use defaults.
    fn load(&self) -> Result<Option<HuntProgress>>;

    fn save(&mut self, progress: &HuntProgress) -> Result<()>;

    /// Forget the saved record so the next `load` returns `None`.
    fn clear(&mut self) -> Result<()>;
}

/// Process-lifetime store. Clones share the same slot, which lets tests and
/// hosts observe what a session wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    slot: Arc<Mutex<Option<HuntProgress>>>,
}

impl MemoryProgressStore {
    pub fn with_progress(progress: HuntProgress) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(progress))),
        }
    }

    pub fn snapshot(&self) -> Option<HuntProgress> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Option<HuntProgress>> {
        Ok(self.snapshot())
    }

    fn save(&mut self, progress: &HuntProgress) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(*progress);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
