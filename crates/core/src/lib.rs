//! Core types for txscope
//!
//! This crate defines the vocabulary every other layer speaks:
//! - [`Xid`] and the model enums ([`BranchType`], [`GlobalStatus`],
//!   [`GlobalTransactionRole`])
//! - Error types ([`CoreError`], [`TransactionError`])
//! - Collaborator contracts ([`TransactionManager`], [`lock::GlobalLockQuery`])

#![warn(clippy::all)]

pub mod error;
pub mod lock;
pub mod traits;
pub mod types;

pub use error::{CoreError, CoreResult, TransactionError, TransactionExceptionCode, TxResult};
pub use lock::{GlobalLockParam, GlobalLockQuery, GlobalLockRecord, PageResult};
pub use traits::TransactionManager;
pub use types::{BranchType, GlobalStatus, GlobalTransactionRole, Xid};
