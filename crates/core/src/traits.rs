//! Collaborator contracts
//!
//! The transaction manager is an external collaborator (an RPC client to the
//! coordinator in production). This crate only fixes the shape of the calls;
//! the engine crate drives them and tests supply in-memory implementations.

use crate::error::TxResult;
use crate::types::{GlobalStatus, Xid};

/// Client-side view of the global transaction coordinator
///
/// Every call may fail with a [`TransactionError`](crate::TransactionError);
/// callers propagate those failures unmodified.
///
/// # Thread Safety
///
/// Implementations are shared process-wide and called from any worker, so
/// they must be `Send + Sync`.
pub trait TransactionManager: Send + Sync {
    /// Begin a new global transaction and return its id
    ///
    /// # Arguments
    /// * `application_id` - Id of the calling application
    /// * `tx_service_group` - Transaction service group the application belongs to
    /// * `name` - Transaction name, usually the business method
    /// * `timeout_ms` - Transaction timeout in milliseconds
    fn begin(
        &self,
        application_id: &str,
        tx_service_group: &str,
        name: &str,
        timeout_ms: u64,
    ) -> TxResult<Xid>;

    /// Ask the coordinator to commit
    fn commit(&self, xid: &Xid) -> TxResult<GlobalStatus>;

    /// Ask the coordinator to roll back
    fn rollback(&self, xid: &Xid) -> TxResult<GlobalStatus>;

    /// Query the current status
    fn get_status(&self, xid: &Xid) -> TxResult<GlobalStatus>;

    /// Report a locally decided status (used by saga mode)
    fn global_report(&self, xid: &Xid, status: GlobalStatus) -> TxResult<GlobalStatus>;
}
