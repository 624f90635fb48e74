//! Transactional template
//!
//! Wraps a business call in a global transaction the way a method
//! interceptor does:
//!
//! ```text
//! XID bound on this worker?
//!   yes ─ Participant: run business, leave the binding alone
//!   no  ─ Launcher:    begin ─ bind ─ run business ─┬─ Ok  ─ commit
//!                                                   └─ Err, unwind or drop ─ rollback
//!                      unbind (only what the launcher bound)
//! ```
//!
//! The async variant carries the launched XID into the business future with a
//! [`Propagated`](txscope_concurrency::Propagated) adapter, so it survives
//! every migration between executor threads.
//!
//! ```ignore
//! let template = TransactionalTemplate::new(TmOptions::new("order-service", "order_tx_group"));
//! let order_id = template.execute(&TransactionInfo::new("create-order"), || {
//!     orders.insert(&order)?;
//!     stock.reserve(&order)
//! })?;
//! ```

use crate::error::{EngineError, ExecutionError};
use crate::holder::TransactionManagerHolder;
use crate::options::TmOptions;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use txscope_concurrency::{PropagateExt, RootContext, TransactionScope};
use txscope_core::{GlobalStatus, GlobalTransactionRole, TransactionManager, Xid};

/// Per-call transaction attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    /// Transaction name reported to the manager
    pub name: String,
    /// Timeout override (millis)
    pub timeout_ms: Option<u64>,
}

impl TransactionInfo {
    /// Attributes for a transaction called `name`
    pub fn new(name: impl Into<String>) -> Self {
        TransactionInfo {
            name: name.into(),
            timeout_ms: None,
        }
    }

    /// Override the timeout for this call
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

impl Default for TransactionInfo {
    fn default() -> Self {
        TransactionInfo::new("default")
    }
}

/// Runs business calls inside global transactions
#[derive(Clone, Default)]
pub struct TransactionalTemplate {
    options: TmOptions,
    manager: Option<Arc<dyn TransactionManager>>,
}

impl std::fmt::Debug for TransactionalTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionalTemplate")
            .field("options", &self.options)
            .field("manager", &self.manager.as_ref().map(|_| "<dyn TransactionManager>"))
            .finish()
    }
}

impl TransactionalTemplate {
    /// Template using the manager installed in [`TransactionManagerHolder`]
    pub fn new(options: TmOptions) -> Self {
        TransactionalTemplate {
            options,
            manager: None,
        }
    }

    /// Use `manager` instead of the process-wide one
    pub fn with_manager(mut self, manager: Arc<dyn TransactionManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Options sent on `begin`
    pub fn options(&self) -> &TmOptions {
        &self.options
    }

    /// Role a call made now on this worker would take
    pub fn role() -> GlobalTransactionRole {
        if RootContext::in_global_transaction() {
            GlobalTransactionRole::Participant
        } else {
            GlobalTransactionRole::Launcher
        }
    }

    fn manager(&self) -> Result<Arc<dyn TransactionManager>, EngineError> {
        match &self.manager {
            Some(manager) => Ok(manager.clone()),
            None => TransactionManagerHolder::get(),
        }
    }

    fn timeout_ms(&self, info: &TransactionInfo) -> u64 {
        info.timeout_ms
            .or_else(RootContext::timeout)
            .unwrap_or(self.options.default_timeout_ms)
    }

    fn begin<E>(
        &self,
        manager: &dyn TransactionManager,
        info: &TransactionInfo,
    ) -> Result<Xid, ExecutionError<E>> {
        let timeout_ms = self.timeout_ms(info);
        let xid = manager
            .begin(
                &self.options.application_id,
                &self.options.tx_service_group,
                &info.name,
                timeout_ms,
            )
            .map_err(|e| {
                warn!(name = %info.name, error = %e, "begin global transaction failed");
                ExecutionError::BeginFailed(e)
            })?;
        info!(xid = %xid, name = %info.name, timeout_ms, "began global transaction");
        Ok(xid)
    }

    /// Run `business` inside a global transaction
    ///
    /// Joins the transaction already bound on this worker, or launches one.
    /// A launcher commits on `Ok` and rolls back on `Err` or when `business`
    /// unwinds. It unbinds its XID on every exit path.
    pub fn execute<R, E, F>(&self, info: &TransactionInfo, business: F) -> Result<R, ExecutionError<E>>
    where
        F: FnOnce() -> Result<R, E>,
    {
        if let Some(xid) = RootContext::current_xid() {
            debug!(xid = %xid, name = %info.name, role = %GlobalTransactionRole::Participant, "joining global transaction");
            return business().map_err(ExecutionError::Business);
        }

        let manager = self.manager()?;
        let xid = self.begin(&*manager, info)?;
        let launched = Launched::new(manager, xid).bind();
        let outcome = business();
        launched.complete(outcome)
    }

    /// Async [`execute`](Self::execute)
    ///
    /// The business future runs with the XID bound on whichever thread polls
    /// it; between polls the polling thread's own binding is restored.
    /// Dropping the returned future after `begin` (abort, `select!`,
    /// timeout) rolls the launched transaction back.
    pub async fn execute_async<R, E, Fut>(
        &self,
        info: &TransactionInfo,
        business: Fut,
    ) -> Result<R, ExecutionError<E>>
    where
        Fut: Future<Output = Result<R, E>>,
    {
        if let Some(xid) = RootContext::current_xid() {
            debug!(xid = %xid, name = %info.name, role = %GlobalTransactionRole::Participant, "joining global transaction");
            return business
                .with_transaction_scope(TransactionScope::with_xid(xid))
                .await
                .map_err(ExecutionError::Business);
        }

        let manager = self.manager()?;
        let xid = self.begin(&*manager, info)?;
        let launched = Launched::new(manager, xid.clone());
        let outcome = business
            .with_transaction_scope(TransactionScope::with_xid(xid))
            .await;
        launched.complete(outcome)
    }
}

/// Global transaction begun by a launcher
///
/// Rolls back on drop unless [`complete`](Launched::complete) ran, which
/// covers a business call that unwinds and an async launcher dropped while
/// the business future is pending.
struct Launched {
    manager: Arc<dyn TransactionManager>,
    xid: Xid,
    bound: bool,
    completed: bool,
}

impl Launched {
    fn new(manager: Arc<dyn TransactionManager>, xid: Xid) -> Self {
        Launched {
            manager,
            xid,
            bound: false,
            completed: false,
        }
    }

    /// Bind the XID on this worker until drop
    fn bind(mut self) -> Self {
        RootContext::bind(self.xid.clone());
        self.bound = true;
        self
    }

    fn complete<R, E>(mut self, outcome: Result<R, E>) -> Result<R, ExecutionError<E>> {
        self.completed = true;
        complete(&*self.manager, &self.xid, outcome)
    }
}

impl Drop for Launched {
    fn drop(&mut self) {
        if self.bound {
            if let Some(current) = RootContext::unbind() {
                if current != self.xid {
                    warn!(launched = %self.xid, found = %current, "business call rebound the global transaction");
                }
            }
        }
        if self.completed {
            return;
        }
        warn!(xid = %self.xid, "launcher exited before completion, rolling back");
        match self.manager.rollback(&self.xid) {
            Ok(status) => log_rollback_status(&self.xid, status),
            Err(e) => error!(xid = %self.xid, error = %e, "rollback of abandoned global transaction failed"),
        }
    }
}

fn log_rollback_status(xid: &Xid, status: GlobalStatus) {
    match status {
        GlobalStatus::Rollbacked | GlobalStatus::Finished => {
            info!(xid = %xid, status = %status, "rolled back global transaction")
        }
        other => warn!(xid = %xid, status = %other, "unexpected status after rollback"),
    }
}

fn complete<R, E>(
    manager: &dyn TransactionManager,
    xid: &Xid,
    outcome: Result<R, E>,
) -> Result<R, ExecutionError<E>> {
    match outcome {
        Ok(value) => {
            let status = manager.commit(xid).map_err(|e| {
                warn!(xid = %xid, error = %e, "commit global transaction failed");
                ExecutionError::CommitFailed(e)
            })?;
            match status {
                GlobalStatus::Committed | GlobalStatus::AsyncCommitting | GlobalStatus::Finished => {
                    info!(xid = %xid, status = %status, "committed global transaction")
                }
                other => warn!(xid = %xid, status = %other, "unexpected status after commit"),
            }
            Ok(value)
        }
        Err(business) => match manager.rollback(xid) {
            Ok(status) => {
                log_rollback_status(xid, status);
                Err(ExecutionError::Business(business))
            }
            Err(source) => {
                error!(xid = %xid, error = %source, "rollback failed after business failure");
                Err(ExecutionError::RollbackFailed {
                    source,
                    error: business,
                })
            }
        },
    }
}
