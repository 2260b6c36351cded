use std::sync::{Arc, Mutex, MutexGuard};

use crate::custody::AssetTransfer;
use crate::error::LedgerError;
use crate::ledger::{RequestContext, UbiLedger};
use crate::request::{Request, Response};

/// A ledger handle that can be cloned across threads.
///
/// Requests that arrive concurrently are applied one at a time behind a
/// single lock, so every request still sees the complete result of the one
/// before it.
pub struct SharedLedger<T: AssetTransfer> {
    inner: Arc<Mutex<UbiLedger<T>>>,
}

impl<T: AssetTransfer> Clone for SharedLedger<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: AssetTransfer> SharedLedger<T> {
    pub fn new(ledger: UbiLedger<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn execute(
        &self,
        ctx: &RequestContext,
        request: Request,
    ) -> Result<Response, LedgerError> {
        self.lock()?.dispatch(ctx, request)
    }

    /// Run a read against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&UbiLedger<T>) -> R) -> Result<R, LedgerError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, UbiLedger<T>>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".into()))
    }
}
