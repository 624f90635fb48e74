//! Process-wide transaction manager slot

use crate::error::{EngineError, EngineResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use txscope_core::TransactionManager;

static MANAGER: Lazy<RwLock<Option<Arc<dyn TransactionManager>>>> = Lazy::new(|| RwLock::new(None));

/// Holder for the process-wide [`TransactionManager`]
///
/// Installed once at startup; templates without an explicit manager read it
/// on every launch.
pub struct TransactionManagerHolder {
    _private: (),
}

impl TransactionManagerHolder {
    /// Installed manager
    pub fn get() -> EngineResult<Arc<dyn TransactionManager>> {
        MANAGER.read().clone().ok_or(EngineError::ManagerNotInstalled)
    }

    /// Install `manager`, returning the one it replaces
    pub fn set(manager: Arc<dyn TransactionManager>) -> Option<Arc<dyn TransactionManager>> {
        tracing::debug!("installing transaction manager");
        MANAGER.write().replace(manager)
    }

    /// Remove the installed manager
    pub fn take() -> Option<Arc<dyn TransactionManager>> {
        MANAGER.write().take()
    }

    /// Whether a manager is installed
    pub fn is_installed() -> bool {
        MANAGER.read().is_some()
    }
}
