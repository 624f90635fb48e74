//! Scheduler integration
//!
//! A unit of work that may migrate between workers carries a
//! [`TransactionScope`]. The runtime owes it two calls per residency on a
//! worker:
//!
//! ```text
//! worker A: on_resume ── run ── on_suspend      (task yields Pending)
//! worker B: on_resume ── run ── on_suspend      (task completes or fails)
//! ```
//!
//! [`ExecutionHook`] names those calls; [`HookGuard`] makes `on_suspend`
//! unconditional. The adapters below apply the hook to the two hand-off
//! shapes Rust code has:
//!
//! - Futures: [`Propagated`] wraps a future and resumes/suspends the scope
//!   around every `poll`, so the XID follows the task across executor
//!   threads. Because the scope is suspended before each `poll` returns,
//!   a task cancelled while pending has nothing left to restore.
//! - Closures: [`wrap`] moves a scope into a closure for thread pools and
//!   `std::thread::spawn`.

use crate::config;
use crate::scope::TransactionScope;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::Span;

/// Calls a runtime makes around each residency of a unit of work on a worker
pub trait ExecutionHook {
    /// The unit of work is about to run on the calling worker
    fn on_resume(&mut self);

    /// The unit of work stopped running on the calling worker
    ///
    /// Called on suspension, completion and failure alike, before the
    /// worker runs anything else.
    fn on_suspend(&mut self);
}

impl ExecutionHook for TransactionScope {
    /// # Panics
    ///
    /// If the scope is already active; a runtime resumed the same unit of
    /// work twice.
    fn on_resume(&mut self) {
        if let Err(e) = self.activate() {
            panic!("{}", e);
        }
    }

    /// # Panics
    ///
    /// If the scope is not active; a runtime suspended a unit of work it
    /// never resumed.
    fn on_suspend(&mut self) {
        if let Err(e) = self.deactivate() {
            panic!("{}", e);
        }
    }
}

/// Resumed hook; suspends it on drop
#[must_use = "the hook is suspended as soon as the guard is dropped"]
pub struct HookGuard<'a, H: ExecutionHook + ?Sized> {
    hook: &'a mut H,
}

impl<'a, H: ExecutionHook + ?Sized> HookGuard<'a, H> {
    /// Resume `hook` on the calling worker
    pub fn resume(hook: &'a mut H) -> Self {
        hook.on_resume();
        HookGuard { hook }
    }
}

impl<H: ExecutionHook + ?Sized> Drop for HookGuard<'_, H> {
    fn drop(&mut self) {
        self.hook.on_suspend();
    }
}

/// Move `scope` into `f` so it is active on whichever thread runs the closure
///
/// # Examples
///
/// ```
/// use txscope_concurrency::{hook, RootContext, TransactionScope};
/// use txscope_core::Xid;
///
/// RootContext::bind(Xid::new("tx-9").unwrap());
/// let job = hook::wrap(TransactionScope::capture(), || RootContext::current_xid());
///
/// let seen = std::thread::spawn(job).join().unwrap();
/// assert_eq!(seen.unwrap().as_str(), "tx-9");
/// # RootContext::unbind();
/// ```
pub fn wrap<F, R>(scope: TransactionScope, f: F) -> impl FnOnce() -> R + Send
where
    F: FnOnce() -> R + Send,
{
    move || {
        let mut scope = scope;
        let _resumed = HookGuard::resume(&mut scope);
        f()
    }
}

/// Future adapter that carries a [`TransactionScope`] across polls
///
/// Every `poll` resumes the scope on the polling thread, polls the inner
/// future, and suspends the scope before returning, whether the inner
/// future is pending, ready, or unwinding.
///
/// With [`ContextConfig::trace_spans`](crate::ContextConfig::trace_spans)
/// enabled, a `global_transaction` span carrying the XID is entered for the
/// duration of each poll.
#[must_use = "futures do nothing unless polled"]
pub struct Propagated<F> {
    inner: Pin<Box<F>>,
    scope: TransactionScope,
    span: Option<Span>,
}

impl<F: Future> Propagated<F> {
    /// Wrap `future` with `scope`
    pub fn new(future: F, scope: TransactionScope) -> Self {
        let span = match scope.captured_xid() {
            Some(xid) if config::trace_spans() => {
                Some(tracing::info_span!("global_transaction", xid = %xid))
            }
            _ => None,
        };
        Propagated {
            inner: Box::pin(future),
            scope,
            span,
        }
    }

    /// Scope carried by this future
    pub fn scope(&self) -> &TransactionScope {
        &self.scope
    }
}

impl<F: Future> Future for Propagated<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Unpin: the inner future is boxed
        let this = self.get_mut();
        let _entered = this.span.as_ref().map(Span::enter);
        let _resumed = HookGuard::resume(&mut this.scope);
        this.inner.as_mut().poll(cx)
    }
}

/// Attach transaction propagation to any future
pub trait PropagateExt: Future + Sized {
    /// Capture the calling worker's XID now and carry it with this future
    fn propagate_transaction(self) -> Propagated<Self> {
        Propagated::new(self, TransactionScope::capture())
    }

    /// Carry an explicit scope with this future
    fn with_transaction_scope(self, scope: TransactionScope) -> Propagated<Self> {
        Propagated::new(self, scope)
    }
}

impl<F: Future> PropagateExt for F {}

/// Spawn `future` on the current tokio runtime, carrying the caller's XID
#[cfg(feature = "tokio-runtime")]
pub fn spawn_propagated<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future.propagate_transaction())
}

/// Run `f` on tokio's blocking pool, carrying the caller's XID
#[cfg(feature = "tokio-runtime")]
pub fn spawn_blocking_propagated<F, R>(f: F) -> tokio::task::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(wrap(TransactionScope::capture(), f))
}
