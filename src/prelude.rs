//! Convenient imports for txscope.
//!
//! ```ignore
//! use txscope::prelude::*;
//!
//! let job = TransactionScope::capture().wrap(|| RootContext::current_xid());
//! std::thread::spawn(job);
//! ```

// Error handling
pub use crate::error::{Error, Result};

// Model
pub use crate::{BranchType, GlobalStatus, TransactionManager, Xid};

// Context
pub use crate::{PropagateExt, RootContext, TransactionScope};
#[cfg(feature = "tokio-runtime")]
pub use crate::spawn_propagated;

// Execution
pub use crate::{TmOptions, TransactionInfo, TransactionManagerHolder, TransactionalTemplate};

pub use std::sync::Arc;
