//! Audit trail of store operations
//!
//! The request handler appends one record after every store call. Records
//! render as `<timestamp> => <OPERATION> '<key>' , Status: <0|1>`, where
//! status `0` means the store reported success.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::util::time::{self, Timestamp};

/// Default number of records retained before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Operation names as they appear in the audit text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Exists,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Exists => "EXISTS",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub at: Timestamp,
    pub operation: Operation,
    pub key: String,
    pub success: bool,
}

impl Record {
    pub fn new(operation: Operation, key: impl Into<String>, success: bool) -> Self {
        Self {
            at: time::now(),
            operation,
            key: key.into(),
            success,
        }
    }

    /// `0` for success, `1` for an expected miss
    pub fn status(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} => {} '{}' , Status: {}",
            time::format(&self.at),
            self.operation,
            self.key,
            self.status()
        )
    }
}

/// Bounded in-memory audit log
pub struct AuditLog {
    records: Mutex<VecDeque<Record>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a log keeping at most `capacity` records (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append a record for a completed store call
    pub fn record(&self, operation: Operation, key: &str, success: bool) {
        let record = Record::new(operation, key, success);
        debug!(
            operation = %record.operation,
            key = %record.key,
            status = record.status(),
            "audit"
        );

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Copy of the retained records, oldest first
    pub fn records(&self) -> Vec<Record> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.iter().cloned().collect()
    }

    /// The whole retained log as text
    pub fn render(&self) -> String {
        self.records().iter().map(Record::to_string).collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
