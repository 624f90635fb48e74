//! Ambient transaction store
//!
//! Every worker thread owns one slot holding the transaction context of the
//! code it is currently running. Slots are `thread_local!`, so a write on
//! one worker is never visible on another and no locking is needed.
//!
//! ## Slot Entries
//!
//! | Key | Entry | Propagated |
//! |-----|-------|------------|
//! | `TX_XID` | global transaction id | yes, by [`TransactionScope`](crate::TransactionScope) |
//! | `TX_BRANCH_TYPE` | branch mode bound by a branch interceptor | no |
//! | `TX_LOCK` | "require global lock" flag | no |
//! | `TX_TIMEOUT` | per-worker timeout override (millis) | no |
//!
//! Cooperative tasks share worker threads, so the slot alone does not follow
//! a task that migrates. The scheduler hook in [`crate::hook`] installs and
//! restores the XID around every resumption for that case.

use crate::config;
use crate::error::{ContextError, ContextResult};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tracing::debug;
use txscope_core::{BranchType, Xid};

thread_local! {
    static SLOT: RefCell<Slot> = RefCell::new(Slot::default());
}

#[derive(Debug, Default, Clone)]
struct Slot {
    xid: Option<Xid>,
    branch_type: Option<BranchType>,
    global_lock: bool,
    timeout_ms: Option<u64>,
}

/// Runs `f` against this worker's slot.
///
/// Once the slot has been destroyed during thread exit, reads see an empty
/// slot and writes are dropped.
fn with_slot<R: Default>(f: impl FnOnce(&mut Slot) -> R) -> R {
    SLOT.try_with(|slot| f(&mut slot.borrow_mut()))
        .unwrap_or_default()
}

/// Snapshot of one worker's slot
///
/// Serialises with the canonical context keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntries {
    /// Bound global transaction id
    #[serde(rename = "TX_XID", skip_serializing_if = "Option::is_none", default)]
    pub xid: Option<Xid>,
    /// Bound branch type
    #[serde(rename = "TX_BRANCH_TYPE", skip_serializing_if = "Option::is_none", default)]
    pub branch_type: Option<BranchType>,
    /// Global lock flag
    #[serde(rename = "TX_LOCK", skip_serializing_if = "std::ops::Not::not", default)]
    pub global_lock: bool,
    /// Timeout override in milliseconds
    #[serde(rename = "TX_TIMEOUT", skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl ContextEntries {
    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.xid.is_none()
            && self.branch_type.is_none()
            && !self.global_lock
            && self.timeout_ms.is_none()
    }
}

/// Per-worker transaction context
///
/// All functions act on the calling thread's slot only.
///
/// # Examples
///
/// ```
/// use txscope_concurrency::RootContext;
/// use txscope_core::Xid;
///
/// let xid = Xid::new("10.0.0.1:8091:42").unwrap();
/// RootContext::bind(xid.clone());
/// assert!(RootContext::in_global_transaction());
/// assert_eq!(RootContext::unbind(), Some(xid));
/// assert!(RootContext::current_xid().is_none());
/// ```
pub struct RootContext {
    _private: (),
}

impl RootContext {
    /// Context key of the global transaction id
    pub const KEY_XID: &'static str = "TX_XID";
    /// Context key of the branch type
    pub const KEY_BRANCH_TYPE: &'static str = "TX_BRANCH_TYPE";
    /// Context key of the global lock flag
    pub const KEY_GLOBAL_LOCK_FLAG: &'static str = "TX_LOCK";
    /// Context key of the timeout override
    pub const KEY_TIMEOUT: &'static str = "TX_TIMEOUT";

    // ========================================================================
    // XID
    // ========================================================================

    /// Bind `xid` on this worker, replacing any previous binding
    ///
    /// Returns the replaced id. Bindings do not stack: a later `unbind`
    /// clears the slot rather than restoring the replaced id.
    pub fn bind(xid: Xid) -> Option<Xid> {
        debug!(xid = %xid, "bind global transaction");
        with_slot(|slot| slot.xid.replace(xid))
    }

    /// Bind from a raw string; a blank string switches to [`RootContext::unbind`]
    pub fn bind_str(xid: &str) -> Option<Xid> {
        match Xid::parse(xid) {
            Some(xid) => Self::bind(xid),
            None => {
                debug!("xid is blank, switching to unbind");
                Self::unbind()
            }
        }
    }

    /// Clear the binding on this worker, returning the removed id
    pub fn unbind() -> Option<Xid> {
        let removed = with_slot(|slot| slot.xid.take());
        if let Some(xid) = &removed {
            debug!(xid = %xid, "unbind global transaction");
        }
        removed
    }

    /// Id bound on this worker
    pub fn current_xid() -> Option<Xid> {
        with_slot(|slot| slot.xid.clone())
    }

    /// Whether this worker's binding equals `expected` (no clone)
    pub fn xid_matches(expected: Option<&Xid>) -> bool {
        SLOT.try_with(|slot| slot.borrow().xid.as_ref() == expected)
            .unwrap_or(expected.is_none())
    }

    /// Set the binding to exactly `xid`: bind when present, unbind when absent
    pub fn restore(xid: Option<Xid>) {
        match xid {
            Some(xid) => {
                Self::bind(xid);
            }
            None => {
                Self::unbind();
            }
        }
    }

    /// Whether a global transaction is bound on this worker
    pub fn in_global_transaction() -> bool {
        with_slot(|slot| slot.xid.is_some())
    }

    /// Fail when a global transaction is bound on this worker
    pub fn assert_not_in_global_transaction() -> ContextResult<()> {
        match Self::current_xid() {
            Some(xid) => Err(ContextError::UnexpectedGlobalTransaction(xid)),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Branch type
    // ========================================================================

    /// Bind a branch type on this worker, returning the replaced one
    pub fn bind_branch_type(branch_type: BranchType) -> Option<BranchType> {
        debug!(%branch_type, "bind branch type");
        with_slot(|slot| slot.branch_type.replace(branch_type))
    }

    /// Clear the branch type on this worker, returning the removed one
    pub fn unbind_branch_type() -> Option<BranchType> {
        let removed = with_slot(|slot| slot.branch_type.take());
        if let Some(t) = removed {
            debug!(branch_type = %t, "unbind branch type");
        }
        removed
    }

    /// Effective branch type
    ///
    /// Outside a global transaction this is `None`. Inside one it is the
    /// bound branch type, else the configured default, else `AT`.
    pub fn branch_type() -> Option<BranchType> {
        let (in_tx, bound) = with_slot(|slot| (slot.xid.is_some(), slot.branch_type));
        if !in_tx {
            return None;
        }
        bound
            .or_else(config::default_branch_type)
            .or(Some(BranchType::AT))
    }

    /// Whether this worker runs a TCC branch
    pub fn in_tcc_branch() -> bool {
        Self::branch_type() == Some(BranchType::TCC)
    }

    /// Whether this worker runs a SAGA branch
    pub fn in_saga_branch() -> bool {
        Self::branch_type() == Some(BranchType::SAGA)
    }

    // ========================================================================
    // Global lock flag
    // ========================================================================

    /// Mark that local transactions on this worker must take the global lock
    pub fn bind_global_lock_flag() {
        debug!("bind global lock flag");
        with_slot(|slot| slot.global_lock = true);
    }

    /// Clear the global lock flag
    pub fn unbind_global_lock_flag() {
        with_slot(|slot| slot.global_lock = false);
    }

    /// Whether the global lock flag is set on this worker
    pub fn require_global_lock() -> bool {
        with_slot(|slot| slot.global_lock)
    }

    // ========================================================================
    // Timeout
    // ========================================================================

    /// Set or clear this worker's timeout override (millis)
    pub fn set_timeout(timeout_ms: Option<u64>) {
        with_slot(|slot| slot.timeout_ms = timeout_ms);
    }

    /// Timeout override for this worker, else the configured default
    pub fn timeout() -> Option<u64> {
        with_slot(|slot| slot.timeout_ms).or_else(config::default_timeout_ms)
    }

    // ========================================================================
    // Whole slot
    // ========================================================================

    /// Snapshot of everything bound on this worker
    pub fn entries() -> ContextEntries {
        with_slot(|slot| ContextEntries {
            xid: slot.xid.clone(),
            branch_type: slot.branch_type,
            global_lock: slot.global_lock,
            timeout_ms: slot.timeout_ms,
        })
    }

    /// Reset every entry on this worker
    pub fn clear() {
        with_slot(|slot| *slot = Slot::default());
    }
}
