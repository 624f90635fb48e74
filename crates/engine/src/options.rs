//! Transaction manager client options

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default global transaction timeout (60s)
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Identity and defaults sent to the transaction manager on `begin`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TmOptions {
    /// Application identifier
    pub application_id: String,
    /// Transaction service group
    pub tx_service_group: String,
    /// Timeout used when neither the call nor the worker overrides it (millis)
    pub default_timeout_ms: u64,
}

impl Default for TmOptions {
    fn default() -> Self {
        TmOptions {
            application_id: "txscope-app".to_string(),
            tx_service_group: "default_tx_group".to_string(),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl TmOptions {
    /// Options for `application_id` in `tx_service_group`
    pub fn new(application_id: impl Into<String>, tx_service_group: impl Into<String>) -> Self {
        TmOptions {
            application_id: application_id.into(),
            tx_service_group: tx_service_group.into(),
            ..Default::default()
        }
    }

    /// Set the default timeout
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let opts: TmOptions =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Reject blank identities and a zero timeout
    pub fn validate(&self) -> EngineResult<()> {
        if self.application_id.trim().is_empty() {
            return Err(EngineError::Config("application_id must not be blank".into()));
        }
        if self.tx_service_group.trim().is_empty() {
            return Err(EngineError::Config("tx_service_group must not be blank".into()));
        }
        if self.default_timeout_ms == 0 {
            return Err(EngineError::Config("default_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
