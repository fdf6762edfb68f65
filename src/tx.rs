//! Transaction

use crate::{Result, cfg::TxCfg, log, ses::SesInner};
use std::sync::Arc;

/// Transaction options.
pub type TxOpts = TxCfg;

/**
An explicit transaction of a session.

While it is active, statements of the session do not auto-commit. A transaction that
is dropped without `commit` or `rollback` is rolled back.

# Example

```no_run
# fn test(ses: &ora::Ses) -> ora::Result<()> {
let tx = ses.start_tx()?;
ses.prep_and_exe("UPDATE test_t SET c2 = 'x' WHERE c1 = :1", &mut [1.into()])?;
tx.commit()?;
# Ok(()) }
```
*/
pub struct Tx {
    id: u64,
    done: bool,
    ses: Arc<SesInner>,
}

impl Drop for Tx {
    fn drop(&mut self) {
        if !self.done {
            if let Err(err) = self.ses.end_tx(self.id, false) {
                tracing::debug!(id = self.id, %err, "implicit rollback failed");
            }
        }
    }
}

impl Tx {
    pub(crate) fn new(id: u64, ses: Arc<SesInner>) -> Self {
        Self { id, done: false, ses }
    }

    /// Returns the process-unique id of this transaction.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reports whether the transaction is still the active one of its session.
    pub fn is_active(&self) -> bool {
        !self.done && self.ses.state.lock().tx == Some(self.id)
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> Result<()> {
        self.done = true;
        self.ses.check()?;
        log::op(|cfg| cfg.tx.commit, "tx", self.id, "commit");
        self.ses.end_tx(self.id, true)
    }

    /// Rolls the transaction back.
    pub fn rollback(mut self) -> Result<()> {
        self.done = true;
        self.ses.check()?;
        log::op(|cfg| cfg.tx.rollback, "tx", self.id, "rollback");
        self.ses.end_tx(self.id, false)
    }
}
