//! Ambient transaction context for txscope
//!
//! This crate carries the global transaction identifier (XID) with a unit of
//! work as it moves between worker threads:
//! - [`RootContext`]: per-worker ambient store (XID, branch type, lock flag, timeout)
//! - [`TransactionScope`]: capture-at-construction snapshot with paired
//!   activate/deactivate and exact restoration
//! - [`ExecutionHook`] / [`Propagated`]: scheduler hand-off for futures and closures
//! - [`config`]: process-wide defaults, never part of the carried state

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod hook;
pub mod scope;
pub mod store;

pub use config::ContextConfig;
pub use error::{ContextError, ContextResult, ScopeError};
pub use hook::{wrap, ExecutionHook, HookGuard, PropagateExt, Propagated};
#[cfg(feature = "tokio-runtime")]
pub use hook::{spawn_blocking_propagated, spawn_propagated};
pub use scope::{ScopeGuard, TransactionScope};
pub use store::{ContextEntries, RootContext};
