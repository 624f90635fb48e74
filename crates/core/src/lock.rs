//! Global lock administration contract
//!
//! The console lists, checks and deletes global-lock records through a
//! paginated query endpoint. Lock storage is not part of this workspace;
//! these types pin down the request/response shapes so a transport layer
//! can be written against them.
//!
//! ## Query Shape
//!
//! ```json
//! {
//!   "xid": "192.168.0.1:8091:42",
//!   "tableName": "account",
//!   "vgroup": "default_tx_group",
//!   "timeStart": 1700000000000,
//!   "pageNum": 1,
//!   "pageSize": 10
//! }
//! ```

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest page the console may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters and paging for a global lock query
///
/// All filters are optional; time bounds are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLockParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vgroup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<i64>,
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for GlobalLockParam {
    fn default() -> Self {
        Self {
            xid: None,
            table_name: None,
            transaction_id: None,
            branch_id: None,
            namespace: None,
            cluster: None,
            vgroup: None,
            time_start: None,
            time_end: None,
            page_num: 1,
            page_size: 10,
        }
    }
}

impl GlobalLockParam {
    /// Create a first-page query with default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by xid
    pub fn xid(mut self, xid: impl Into<String>) -> Self {
        self.xid = Some(xid.into());
        self
    }

    /// Filter by table name
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Filter by creation time window (epoch millis)
    pub fn time_range(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.time_start = start;
        self.time_end = end;
        self
    }

    /// Select a page
    pub fn page(mut self, page_num: u32, page_size: u32) -> Self {
        self.page_num = page_num;
        self.page_size = page_size;
        self
    }

    /// Check paging bounds and the time window
    pub fn validate(&self) -> CoreResult<()> {
        if self.page_num < 1 {
            return Err(CoreError::InvalidQuery("pageNum must be >= 1".into()));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::InvalidQuery(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if let (Some(start), Some(end)) = (self.time_start, self.time_end) {
            if start > end {
                return Err(CoreError::InvalidQuery(format!(
                    "timeStart {} is after timeEnd {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Zero-based offset of the first record on the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One row lock held by a branch of a global transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLockRecord {
    pub xid: String,
    pub transaction_id: String,
    pub branch_id: String,
    pub resource_id: String,
    pub table_name: String,
    pub pk: String,
    pub row_key: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub gmt_create: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub gmt_modified: DateTime<Utc>,
}

/// A page of query results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub page_num: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    /// Build a page for the given query
    pub fn new(records: Vec<T>, total: u64, param: &GlobalLockParam) -> Self {
        Self {
            records,
            total,
            page_num: param.page_num,
            page_size: param.page_size,
        }
    }

    /// Number of pages needed to hold `total` records
    pub fn pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        let size = u64::from(self.page_size);
        self.total / size + u64::from(self.total % size != 0)
    }
}

/// Administrative access to global lock records
pub trait GlobalLockQuery: Send + Sync {
    /// Paginated lookup
    fn query(&self, param: &GlobalLockParam) -> CoreResult<PageResult<GlobalLockRecord>>;

    /// Whether deleting this lock risks a dirty write in a live branch
    fn check(&self, record: &GlobalLockRecord) -> CoreResult<bool>;

    /// Delete the lock identified by the record's xid, branch and row key
    fn delete(&self, record: &GlobalLockRecord) -> CoreResult<()>;
}
