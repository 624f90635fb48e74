//! Unified error types for txscope.
//!
//! This module flattens the per-crate errors into one type that callers of
//! the facade can match on without depending on the member crates.

use thiserror::Error;
use txscope_concurrency::{ContextError, ScopeError};
use txscope_core::{BranchType, CoreError, TransactionError, Xid};
use txscope_engine::{EngineError, ExecutionError};

/// All txscope errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Scope activate/deactivate pairing was violated (a bug in the caller)
    #[error("scope misuse: {0}")]
    Scope(#[from] ScopeError),

    /// A global transaction was bound where none was expected
    #[error("unexpected global transaction: {0}")]
    UnexpectedGlobalTransaction(Xid),

    /// Branch type that cannot be configured as the default
    #[error("illegal default branch type: {0}")]
    IllegalDefaultBranchType(BranchType),

    /// Invalid input (blank XID, unknown code, bad query)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// No transaction manager installed
    #[error("no transaction manager installed")]
    ManagerNotInstalled,

    /// Transaction manager failure (begin, commit)
    #[error("transaction failure: {0}")]
    Transaction(TransactionError),

    /// Business call failed; the global transaction was rolled back
    #[error("business failure: {0}")]
    Business(String),

    /// Business call failed and the rollback failed too
    #[error("rollback failed ({source}) after business failure: {business}")]
    RollbackFailed {
        /// Rollback failure
        source: TransactionError,
        /// Rendered business error
        business: String,
    },
}

/// Result type for txscope operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a contract violation by the caller.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::Scope(_) | Error::UnexpectedGlobalTransaction(_))
    }

    /// Check if the transaction manager reported a failure.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(self, Error::Transaction(_) | Error::RollbackFailed { .. })
    }

    /// Check if the business call is what failed.
    pub fn is_business(&self) -> bool {
        matches!(self, Error::Business(_) | Error::RollbackFailed { .. })
    }
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Transaction(tx) => Error::Transaction(tx),
            other => Error::InvalidInput(other.to_string()),
        }
    }
}

impl From<TransactionError> for Error {
    fn from(e: TransactionError) -> Self {
        Error::Transaction(e)
    }
}

impl From<ContextError> for Error {
    fn from(e: ContextError) -> Self {
        match e {
            ContextError::UnexpectedGlobalTransaction(xid) => Error::UnexpectedGlobalTransaction(xid),
            ContextError::IllegalDefaultBranchType(t) => Error::IllegalDefaultBranchType(t),
            ContextError::Config(msg) => Error::Config(msg),
        }
    }
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ManagerNotInstalled => Error::ManagerNotInstalled,
            EngineError::Config(msg) => Error::Config(msg),
        }
    }
}

// Business errors are rendered; match on ExecutionError directly to keep them typed
impl<E: std::fmt::Display> From<ExecutionError<E>> for Error {
    fn from(e: ExecutionError<E>) -> Self {
        match e {
            ExecutionError::BeginFailed(tx) | ExecutionError::CommitFailed(tx) => {
                Error::Transaction(tx)
            }
            ExecutionError::Business(b) => Error::Business(b.to_string()),
            ExecutionError::RollbackFailed { source, error } => Error::RollbackFailed {
                source,
                business: error.to_string(),
            },
            ExecutionError::Manager(engine) => engine.into(),
        }
    }
}
