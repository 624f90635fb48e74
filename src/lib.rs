//! # txscope
//!
//! Ambient global-transaction context that follows a unit of work across
//! worker threads and async task migrations.
//!
//! ## Quick Start
//!
//! ```ignore
//! use txscope::prelude::*;
//!
//! // Launch a global transaction around a business call
//! TransactionManagerHolder::set(Arc::new(my_tm));
//! let template = TransactionalTemplate::new(TmOptions::new("order-service", "order_tx_group"));
//! template.execute(&TransactionInfo::new("create-order"), || {
//!     // RootContext::current_xid() is bound here
//!     place_order()
//! })?;
//!
//! // Carry the current XID into a spawned task
//! let handle = spawn_propagated(async { RootContext::current_xid() });
//! ```
//!
//! ## Layers
//!
//! - [`RootContext`] - per-worker ambient store
//! - [`TransactionScope`] - capture, install and restore around one activation
//! - [`Propagated`] / [`PropagateExt`] - scheduler hand-off for futures
//! - [`TransactionalTemplate`] - launcher/participant interceptor contract
//! - [`lock`] - admin lock-query contract

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

// Core model
pub use txscope_core::{
    lock, BranchType, CoreError, GlobalStatus, GlobalTransactionRole, TransactionError,
    TransactionExceptionCode, TransactionManager, TxResult, Xid,
};

// Context and propagation
pub use txscope_concurrency::{
    config, hook, wrap, ContextConfig, ContextEntries, ContextError, ExecutionHook, HookGuard,
    PropagateExt, Propagated, RootContext, ScopeError, ScopeGuard, TransactionScope,
};
#[cfg(feature = "tokio-runtime")]
pub use txscope_concurrency::{spawn_blocking_propagated, spawn_propagated};

// Execution
pub use txscope_engine::{
    EngineError, ExecutionError, TmOptions, TransactionInfo, TransactionManagerHolder,
    TransactionalTemplate, DEFAULT_TIMEOUT_MS,
};
