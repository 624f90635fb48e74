//! Error types for the transactional template

use thiserror::Error;
use txscope_core::TransactionError;

/// Engine setup errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// No transaction manager installed in [`TransactionManagerHolder`](crate::TransactionManagerHolder)
    #[error("no transaction manager installed")]
    ManagerNotInstalled,

    /// Options could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for engine setup
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Outcome of a failed transactional execution
///
/// Business errors are carried unmodified. Only the launcher of a global
/// transaction can produce the manager-side variants.
#[derive(Debug, Error)]
pub enum ExecutionError<E> {
    /// The manager refused to begin a global transaction
    #[error("failed to begin global transaction: {0}")]
    BeginFailed(#[source] TransactionError),

    /// The business call succeeded but commit failed
    #[error("failed to commit global transaction: {0}")]
    CommitFailed(#[source] TransactionError),

    /// The business call failed and the transaction was rolled back
    #[error("business failure: {0}")]
    Business(E),

    /// The business call failed and the rollback failed too
    #[error("rollback failed ({source}) after business failure: {error}")]
    RollbackFailed {
        /// Rollback failure
        source: TransactionError,
        /// Original business error
        error: E,
    },

    /// No manager to launch with
    #[error(transparent)]
    Manager(#[from] EngineError),
}

impl<E> ExecutionError<E> {
    /// The business error, if the business call is what failed
    pub fn business(&self) -> Option<&E> {
        match self {
            ExecutionError::Business(e) | ExecutionError::RollbackFailed { error: e, .. } => {
                Some(e)
            }
            _ => None,
        }
    }

    /// Consume into the business error, if any
    pub fn into_business(self) -> Option<E> {
        match self {
            ExecutionError::Business(e) | ExecutionError::RollbackFailed { error: e, .. } => {
                Some(e)
            }
            _ => None,
        }
    }

    /// Manager-side failure, if any
    pub fn transaction_error(&self) -> Option<&TransactionError> {
        match self {
            ExecutionError::BeginFailed(e)
            | ExecutionError::CommitFailed(e)
            | ExecutionError::RollbackFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Map the business error type
    pub fn map_business<F, E2>(self, f: F) -> ExecutionError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            ExecutionError::BeginFailed(e) => ExecutionError::BeginFailed(e),
            ExecutionError::CommitFailed(e) => ExecutionError::CommitFailed(e),
            ExecutionError::Business(e) => ExecutionError::Business(f(e)),
            ExecutionError::RollbackFailed { source, error } => ExecutionError::RollbackFailed {
                source,
                error: f(error),
            },
            ExecutionError::Manager(e) => ExecutionError::Manager(e),
        }
    }
}
