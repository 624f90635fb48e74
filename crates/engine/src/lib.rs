//! Global transaction execution for txscope
//!
//! This crate provides:
//! - [`TransactionManagerHolder`]: process-wide transaction manager slot
//! - [`TransactionalTemplate`]: launcher/participant execution of business
//!   calls, sync and async
//! - [`TmOptions`]: client identity and timeout defaults

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod holder;
pub mod options;
pub mod template;

pub use error::{EngineError, EngineResult, ExecutionError};
pub use holder::TransactionManagerHolder;
pub use options::{TmOptions, DEFAULT_TIMEOUT_MS};
pub use template::{TransactionInfo, TransactionalTemplate};
