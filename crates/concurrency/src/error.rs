//! Error types for the context layer

use thiserror::Error;
use txscope_core::{BranchType, Xid};

/// Contract violations on a [`TransactionScope`](crate::TransactionScope)
///
/// Both variants indicate a bug in the caller (usually a runtime hook that
/// lost track of its pairing), never a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// `activate` called while the scope is already active
    #[error("transaction scope activated twice without an intervening deactivate")]
    AlreadyActive,

    /// `deactivate` called without a matching `activate`
    #[error("transaction scope deactivated without a matching activate")]
    NotActive,
}

/// Errors raised by the ambient store and its configuration
#[derive(Debug, Error)]
pub enum ContextError {
    /// Code that must run outside a global transaction found one bound
    #[error("unexpected global transaction bound on this worker: {0}")]
    UnexpectedGlobalTransaction(Xid),

    /// Only AT and XA may be configured as the default branch type
    #[error("{0} cannot be the default branch type, only AT or XA are allowed")]
    IllegalDefaultBranchType(BranchType),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for context operations
pub type ContextResult<T> = std::result::Result<T, ContextError>;
