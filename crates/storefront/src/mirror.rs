//! Best-effort local mirror of the cart.
//!
//! A write-through cache with no read trust: every rebuild of the cart
//! overwrites the mirror, and the mirror is only ever read to paint a
//! placeholder view before the first remote fetch resolves. It is never
//! a substitute for the authoritative order list.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

use crate::cart::CartEntry;

/// Errors writing the mirror. Callers swallow these; the mirror is an
/// optimization, not a source of truth.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistent key-value slot holding the last known cart contents.
pub trait CartMirror: Send + Sync {
    /// Overwrite the mirrored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, items: &[CartEntry]) -> Result<(), MirrorError>;

    /// Read the last snapshot, if one exists and still decodes.
    fn load(&self) -> Option<Vec<CartEntry>>;
}

/// In-process mirror slot. The ephemeral analog of the browser's
/// `localStorage` cart key; also what the tests use.
#[derive(Default)]
pub struct MemoryMirror {
    slot: Mutex<Option<String>>,
}

impl MemoryMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartMirror for MemoryMirror {
    fn save(&self, items: &[CartEntry]) -> Result<(), MirrorError> {
        let snapshot = serde_json::to_string(items)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        Ok(())
    }

    fn load(&self) -> Option<Vec<CartEntry>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = slot.as_ref()?;
        match serde_json::from_str(snapshot) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("discarding undecodable cart mirror: {e}");
                None
            }
        }
    }
}

/// Mirror backed by a JSON file on disk, for callers that survive process
/// restarts.
pub struct JsonFileMirror {
    path: PathBuf,
}

impl JsonFileMirror {
    /// Create a mirror writing to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartMirror for JsonFileMirror {
    fn save(&self, items: &[CartEntry]) -> Result<(), MirrorError> {
        let snapshot = serde_json::to_string(items)?;
        std::fs::write(&self.path, snapshot)?;
        Ok(())
    }

    fn load(&self) -> Option<Vec<CartEntry>> {
        let snapshot = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&snapshot) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("discarding undecodable cart mirror at {:?}: {e}", self.path);
                None
            }
        }
    }
}
