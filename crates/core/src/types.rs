//! Core types for global transaction coordination
//!
//! This module defines the identity and model types shared by every layer:
//! - [`Xid`]: Opaque identifier of one global transaction
//! - [`BranchType`]: Branch transaction mode (AT, TCC, SAGA, XA)
//! - [`GlobalStatus`]: Lifecycle status reported by the transaction manager
//! - [`GlobalTransactionRole`]: Whether a caller launched or joined a transaction

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifier of a global (distributed) transaction
///
/// Xid is opaque to this crate: it is handed out by the transaction manager
/// on `begin` and travels with the unit of work that belongs to it. It is
/// used in:
/// - The per-worker ambient slot
/// - Propagation scopes that carry it across workers
/// - Every call made to the transaction manager
///
/// Cloning is cheap (shared buffer). Blank ids are rejected at construction,
/// so absence is always expressed as `Option<Xid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Xid(Arc<str>);

impl Xid {
    /// Create an Xid from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use txscope_core::Xid;
    ///
    /// let xid = Xid::new("192.168.0.1:8091:2000042").unwrap();
    /// assert_eq!(xid.as_str(), "192.168.0.1:8091:2000042");
    ///
    /// assert!(Xid::new("   ").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> CoreResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::InvalidXid);
        }
        Ok(Xid(Arc::from(value)))
    }

    /// Parse an optional Xid, treating blank input as "no transaction"
    ///
    /// # Examples
    ///
    /// ```
    /// use txscope_core::Xid;
    ///
    /// assert!(Xid::parse("").is_none());
    /// assert_eq!(Xid::parse("tx-1").unwrap().as_str(), "tx-1");
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        Xid::new(value).ok()
    }

    /// Borrow the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Xid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Xid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Xid::new(s)
    }
}

impl TryFrom<String> for Xid {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Xid::new(value)
    }
}

impl From<Xid> for String {
    fn from(xid: Xid) -> Self {
        xid.0.to_string()
    }
}

/// Branch transaction mode
///
/// Codes are part of the wire protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchType {
    /// Automatic (undo-log based) mode
    AT,
    /// Try-Confirm-Cancel mode
    TCC,
    /// Long-running saga mode
    SAGA,
    /// XA two-phase mode
    XA,
}

impl BranchType {
    /// All branch types in code order
    pub const ALL: [BranchType; 4] = [
        BranchType::AT,
        BranchType::TCC,
        BranchType::SAGA,
        BranchType::XA,
    ];

    /// Wire code of this branch type
    pub fn code(self) -> u8 {
        match self {
            BranchType::AT => 0,
            BranchType::TCC => 1,
            BranchType::SAGA => 2,
            BranchType::XA => 3,
        }
    }

    /// Look up a branch type by wire code
    pub fn from_code(code: u8) -> CoreResult<Self> {
        BranchType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(CoreError::UnknownBranchType(code))
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            BranchType::AT => "AT",
            BranchType::TCC => "TCC",
            BranchType::SAGA => "SAGA",
            BranchType::XA => "XA",
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BranchType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BranchType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| CoreError::InvalidBranchTypeName(s.to_string()))
    }
}

/// Status of a global transaction as reported by the transaction manager
///
/// Codes are part of the wire protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalStatus {
    /// Unknown status
    UnKnown,
    /// Transaction began and is accepting branches
    Begin,
    /// Second phase: committing
    Committing,
    /// Commit failed and is being retried
    CommitRetrying,
    /// Second phase: rolling back
    Rollbacking,
    /// Rollback failed and is being retried
    RollbackRetrying,
    /// Rolling back because the transaction timed out
    TimeoutRollbacking,
    /// Timeout rollback is being retried
    TimeoutRollbackRetrying,
    /// Commit accepted, branches committed asynchronously
    AsyncCommitting,
    /// Committed
    Committed,
    /// Commit failed
    CommitFailed,
    /// Rolled back
    Rollbacked,
    /// Rollback failed
    RollbackFailed,
    /// Rolled back after timeout
    TimeoutRollbacked,
    /// Timeout rollback failed
    TimeoutRollbackFailed,
    /// Finished (session removed)
    Finished,
    /// Commit retries exhausted
    CommitRetryTimeout,
    /// Rollback retries exhausted
    RollbackRetryTimeout,
}

impl GlobalStatus {
    /// All statuses in code order
    pub const ALL: [GlobalStatus; 18] = [
        GlobalStatus::UnKnown,
        GlobalStatus::Begin,
        GlobalStatus::Committing,
        GlobalStatus::CommitRetrying,
        GlobalStatus::Rollbacking,
        GlobalStatus::RollbackRetrying,
        GlobalStatus::TimeoutRollbacking,
        GlobalStatus::TimeoutRollbackRetrying,
        GlobalStatus::AsyncCommitting,
        GlobalStatus::Committed,
        GlobalStatus::CommitFailed,
        GlobalStatus::Rollbacked,
        GlobalStatus::RollbackFailed,
        GlobalStatus::TimeoutRollbacked,
        GlobalStatus::TimeoutRollbackFailed,
        GlobalStatus::Finished,
        GlobalStatus::CommitRetryTimeout,
        GlobalStatus::RollbackRetryTimeout,
    ];

    /// Wire code of this status
    pub fn code(self) -> i32 {
        // Variants are declared in code order
        self as i32
    }

    /// Look up a status by wire code
    pub fn from_code(code: i32) -> CoreResult<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| GlobalStatus::ALL.get(idx).copied())
            .ok_or(CoreError::UnknownGlobalStatus(code))
    }

    /// Whether the transaction has reached a terminal state
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            GlobalStatus::Committed
                | GlobalStatus::CommitFailed
                | GlobalStatus::Rollbacked
                | GlobalStatus::RollbackFailed
                | GlobalStatus::TimeoutRollbacked
                | GlobalStatus::TimeoutRollbackFailed
                | GlobalStatus::Finished
                | GlobalStatus::CommitRetryTimeout
                | GlobalStatus::RollbackRetryTimeout
        )
    }
}

impl fmt::Display for GlobalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Role a caller plays in a global transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalTransactionRole {
    /// Began the transaction and is responsible for committing or rolling it back
    Launcher,
    /// Joined a transaction that was already bound on this worker
    Participant,
}

impl fmt::Display for GlobalTransactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalTransactionRole::Launcher => f.write_str("Launcher"),
            GlobalTransactionRole::Participant => f.write_str("Participant"),
        }
    }
}
