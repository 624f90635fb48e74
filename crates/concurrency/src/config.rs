//! Process-wide context configuration
//!
//! Configuration never travels with a unit of work: it is read from a single
//! process-wide cell, installed once at startup.
//!
//! ```ignore
//! use txscope_concurrency::config::{self, ContextConfig};
//!
//! let cfg = ContextConfig::from_toml_str(r#"
//!     default_branch_type = "XA"
//!     default_timeout_ms = 30000
//!     trace_spans = true
//! "#)?;
//! config::install(cfg);
//! ```

use crate::error::{ContextError, ContextResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use txscope_core::BranchType;

static CONFIG: Lazy<RwLock<ContextConfig>> = Lazy::new(|| RwLock::new(ContextConfig::default()));

/// Ambient context configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// Branch type reported inside a global transaction when none is bound
    ///
    /// Only `AT` and `XA` are accepted; `None` falls back to `AT`.
    pub default_branch_type: Option<BranchType>,
    /// Timeout applied when a worker has no explicit override (millis)
    pub default_timeout_ms: Option<u64>,
    /// Enter a `global_transaction` tracing span while a propagated unit of
    /// work is being polled
    pub trace_spans: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            default_branch_type: None,
            default_timeout_ms: None,
            trace_spans: true,
        }
    }
}

impl ContextConfig {
    /// Defaults without span instrumentation
    pub fn quiet() -> Self {
        ContextConfig {
            trace_spans: false,
            ..Default::default()
        }
    }

    /// Set the default branch type, rejecting modes that cannot be defaults
    pub fn with_default_branch_type(mut self, branch_type: BranchType) -> ContextResult<Self> {
        check_default_branch_type(branch_type)?;
        self.default_branch_type = Some(branch_type);
        Ok(self)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> ContextResult<Self> {
        let cfg: ContextConfig =
            toml::from_str(source).map_err(|e| ContextError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ContextResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ContextError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> ContextResult<()> {
        if let Some(t) = self.default_branch_type {
            check_default_branch_type(t)?;
        }
        Ok(())
    }
}

fn check_default_branch_type(branch_type: BranchType) -> ContextResult<()> {
    match branch_type {
        BranchType::AT | BranchType::XA => Ok(()),
        other => Err(ContextError::IllegalDefaultBranchType(other)),
    }
}

/// Install a configuration process-wide, returning the previous one
pub fn install(config: ContextConfig) -> ContextResult<ContextConfig> {
    config.validate()?;
    tracing::debug!(?config, "installing context configuration");
    Ok(std::mem::replace(&mut *CONFIG.write(), config))
}

/// Snapshot of the installed configuration
pub fn current() -> ContextConfig {
    CONFIG.read().clone()
}

pub(crate) fn default_branch_type() -> Option<BranchType> {
    CONFIG.read().default_branch_type
}

pub(crate) fn default_timeout_ms() -> Option<u64> {
    CONFIG.read().default_timeout_ms
}

pub(crate) fn trace_spans() -> bool {
    CONFIG.read().trace_spans
}
