//! Commit/rollback guard around mutations of the cached log.

use swx_core::{Clock, EventStore};
use tracing::debug;

use crate::TimeLog;
use crate::error::LogError;

/// An open transaction on a [`TimeLog`].
///
/// Beginning a transaction loads the cache if it is stale. Mutations go
/// straight to the cached store. [`commit`](Self::commit) writes the whole
/// store to disk; dropping the transaction without committing (an early
/// return, an error, or a panic unwinding through it) marks the cache stale so
/// the next access reloads the untouched file.
pub(crate) struct Transaction<'a, C: Clock> {
    log: &'a mut TimeLog<C>,
    committed: bool,
}

impl<'a, C: Clock> Transaction<'a, C> {
    pub(crate) fn begin(log: &'a mut TimeLog<C>) -> Result<Self, LogError> {
        log.load()?;
        Ok(Self {
            log,
            committed: false,
        })
    }

    pub(crate) fn store(&mut self) -> &mut EventStore {
        &mut self.log.store
    }

    pub(crate) fn commit(mut self) -> Result<(), LogError> {
        self.log.save()?;
        self.committed = true;
        Ok(())
    }
}

impl<C: Clock> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(path = %self.log.file.path().display(), "rolling back time log transaction");
            self.log.mark_stale();
        }
    }
}
