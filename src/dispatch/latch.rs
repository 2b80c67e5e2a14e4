//! Fatal-error latch shared by every job in a batch.

use crate::error::StyleguardError;
use std::sync::Arc;
use std::sync::OnceLock;

/// Set-at-most-once latch carrying the error that ended a batch.
///
/// Cloning is cheap; all clones observe the same cell. Once set, jobs that have not
/// started refuse to start, the retry executor stops scheduling attempts, and the
/// dispatcher returns the stored error instead of a result list.
#[derive(Debug, Clone, Default)]
pub struct FatalLatch {
    cell: Arc<OnceLock<StyleguardError>>,
}

impl FatalLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the triggering error. Returns `true` for the first caller; later calls
    /// leave the original error in place and return `false`.
    pub fn set(&self, error: StyleguardError) -> bool {
        self.cell.set(error).is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Copy of the stored error, if any.
    pub fn error(&self) -> Option<StyleguardError> {
        self.cell.get().cloned()
    }
}
