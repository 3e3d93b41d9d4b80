//! Snapshot index data types
//!
//! - `SnapshotIndexEntry`: one dated snapshot listed in the index
//! - `SnapshotIndex`: the two payload shapes an index document may take

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Extension used when an entry does not name its file
pub const DEFAULT_SNAPSHOT_EXTENSION: &str = "md";

/// Date format of snapshot days (`YYYY-MM-DD`)
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One snapshot listed in the index
///
/// Only `date` is required. Duplicated dates are kept as separate entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotIndexEntry {
    /// Snapshot day, zero-padded ISO (`2024-02-01`)
    pub date: String,
    /// Where the trends came from (e.g. `google-trends(PL)`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Number of trends captured that day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// File name relative to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl SnapshotIndexEntry {
    /// Create an entry with only the required date
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            source: None,
            count: None,
            file: None,
        }
    }

    /// Builder method: set source label
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builder method: set trend count
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Builder method: set file name
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// File name of the snapshot, derived as `<date>.md` when absent
    pub fn file_name(&self) -> String {
        match &self.file {
            Some(file) if !file.is_empty() => file.clone(),
            _ => format!("{}.{}", self.date, DEFAULT_SNAPSHOT_EXTENSION),
        }
    }

    /// Whether `date` is a valid zero-padded ISO day.
    ///
    /// Descending lexical order only matches chronological order for
    /// these, so other dates are rendered but reported.
    pub fn is_iso_date(&self) -> bool {
        self.date.len() == 10
            && NaiveDate::parse_from_str(&self.date, SNAPSHOT_DATE_FORMAT).is_ok()
    }
}

/// An index document in one of its accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotIndex {
    /// Canonical shape: `[{date, source?, count?, file?}, ...]`
    Entries(Vec<serde_json::Value>),
    /// Legacy shape: `{"days": ["YYYY-MM-DD", ...]}`
    Days(Vec<serde_json::Value>),
}

impl SnapshotIndex {
    /// Raw items carried by the payload, whichever the shape
    pub fn items(&self) -> &[serde_json::Value] {
        match self {
            SnapshotIndex::Entries(items) | SnapshotIndex::Days(items) => items,
        }
    }

    /// Short name of the shape, used in logs
    pub fn shape(&self) -> &'static str {
        match self {
            SnapshotIndex::Entries(_) => "entries",
            SnapshotIndex::Days(_) => "days",
        }
    }
}
