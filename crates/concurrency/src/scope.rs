//! Propagation scope
//!
//! A [`TransactionScope`] carries one captured XID to whichever worker runs
//! the unit of work next, and puts that worker's slot back the way it found
//! it when the unit of work stops running there.
//!
//! ## Activation Protocol
//!
//! ```text
//! activate():                          deactivate():
//!   saved := slot                        if slot != saved:
//!   if captured is present:                  slot := saved   (unbind if absent)
//!       slot := captured
//! ```
//!
//! An absent captured id never clears the slot, so a scope that has nothing
//! to propagate leaves an enclosing binding alone. The single restore rule
//! covers every case: forced install, install over an empty slot, untouched
//! ambient value, and mutations made by the guarded code.
//!
//! ## Pairing
//!
//! `activate` and `deactivate` alternate strictly, on the same worker, and
//! `deactivate` must run on every exit path. [`TransactionScope::enter`]
//! returns a guard that deactivates on drop, which covers unwinding too.

use crate::error::ScopeError;
use crate::store::RootContext;
use tracing::trace;
use txscope_core::Xid;

/// Captured transaction identity with save/install/restore semantics
///
/// # Examples
///
/// ```
/// use txscope_concurrency::{RootContext, TransactionScope};
/// use txscope_core::Xid;
///
/// RootContext::bind(Xid::new("T1").unwrap());
///
/// let mut scope = TransactionScope::with_xid(Xid::new("T2").unwrap());
/// scope.activate().unwrap();
/// assert_eq!(RootContext::current_xid().unwrap().as_str(), "T2");
/// scope.deactivate().unwrap();
/// assert_eq!(RootContext::current_xid().unwrap().as_str(), "T1");
/// # RootContext::unbind();
/// ```
#[derive(Debug)]
pub struct TransactionScope {
    /// Identity installed on activation; frozen at construction
    captured: Option<Xid>,
    /// Slot value observed by the pending activation
    ///
    /// `None` while inactive; `Some(saved)` between activate and deactivate.
    saved: Option<Option<Xid>>,
}

impl TransactionScope {
    /// Capture the calling worker's current XID
    ///
    /// The value is frozen now; later binds on this worker do not change
    /// what the scope installs.
    pub fn capture() -> Self {
        Self::new(RootContext::current_xid())
    }

    /// Scope carrying exactly `captured`, without reading the slot
    ///
    /// An explicit `None` means "nothing to propagate".
    pub fn new(captured: Option<Xid>) -> Self {
        TransactionScope {
            captured,
            saved: None,
        }
    }

    /// Scope carrying `xid`
    pub fn with_xid(xid: Xid) -> Self {
        Self::new(Some(xid))
    }

    /// Scope that propagates nothing
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Identity this scope installs
    pub fn captured_xid(&self) -> Option<&Xid> {
        self.captured.as_ref()
    }

    /// Whether an activation is pending its deactivate
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Save the calling worker's slot and install the captured id
    ///
    /// # Errors
    ///
    /// [`ScopeError::AlreadyActive`] if the previous activation has not been
    /// deactivated. The slot is left untouched in that case.
    pub fn activate(&mut self) -> Result<(), ScopeError> {
        if self.saved.is_some() {
            return Err(ScopeError::AlreadyActive);
        }
        let saved = RootContext::current_xid();
        if let Some(xid) = &self.captured {
            trace!(xid = %xid, previous = ?saved, "activate transaction scope");
            RootContext::bind(xid.clone());
        }
        self.saved = Some(saved);
        Ok(())
    }

    /// Restore the value observed by the matching [`activate`](Self::activate)
    ///
    /// The slot is only written when it differs from the saved value.
    ///
    /// # Errors
    ///
    /// [`ScopeError::NotActive`] without a pending activation. The slot is
    /// left untouched in that case.
    pub fn deactivate(&mut self) -> Result<(), ScopeError> {
        let saved = self.saved.take().ok_or(ScopeError::NotActive)?;
        if !RootContext::xid_matches(saved.as_ref()) {
            trace!(restore = ?saved, "restore transaction scope");
            RootContext::restore(saved);
        }
        Ok(())
    }

    /// Activate and return a guard that deactivates when dropped
    pub fn enter(&mut self) -> Result<ScopeGuard<'_>, ScopeError> {
        self.activate()?;
        Ok(ScopeGuard { scope: self })
    }

    /// Run `f` with the scope active on the calling worker
    ///
    /// The slot is restored even if `f` panics.
    pub fn run<R>(&mut self, f: impl FnOnce() -> R) -> Result<R, ScopeError> {
        let _guard = self.enter()?;
        Ok(f())
    }

    /// Move this scope into a closure for hand-off to another worker
    ///
    /// The returned closure activates the scope on whichever thread calls
    /// it. Misuse is impossible here because the closure owns a fresh scope.
    pub fn wrap<F, R>(self, f: F) -> impl FnOnce() -> R + Send
    where
        F: FnOnce() -> R + Send,
    {
        crate::hook::wrap(self, f)
    }
}

impl Clone for TransactionScope {
    /// Same captured id, fresh (inactive) activation state
    fn clone(&self) -> Self {
        Self::new(self.captured.clone())
    }
}

impl From<Option<Xid>> for TransactionScope {
    fn from(captured: Option<Xid>) -> Self {
        Self::new(captured)
    }
}

impl From<Xid> for TransactionScope {
    fn from(xid: Xid) -> Self {
        Self::with_xid(xid)
    }
}

/// Active [`TransactionScope`]; deactivates on drop
#[must_use = "the scope deactivates as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    scope: &'a mut TransactionScope,
}

impl ScopeGuard<'_> {
    /// Identity installed by this activation
    pub fn captured_xid(&self) -> Option<&Xid> {
        self.scope.captured_xid()
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // The guard is only built after a successful activate, and holds the
        // scope exclusively, so the pairing cannot have been broken.
        if let Err(e) = self.scope.deactivate() {
            tracing::error!(error = %e, "scope guard found its scope inactive");
        }
    }
}
