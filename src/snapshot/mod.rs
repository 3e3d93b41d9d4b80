//! Snapshot Index
//!
//! The index is the manifest published next to the daily snapshot files:
//!
//! - **types**: `SnapshotIndexEntry` and the accepted payload shapes
//! - **normalize**: shape validation, date filtering and newest-first sort
//! - **error**: error types
//!
//! # Payload shapes
//!
//! ```text
//! Canonical:  [{"date": "2024-02-01", "source": "...", "count": 5, "file": "2024-02-01.md"}]
//! Legacy:     {"days": ["2024-02-01", "2024-01-31"]}
//! ```
//!
//! Anything else is a schema error.

pub mod error;
pub mod normalize;
pub mod types;

pub use error::{IndexError, IndexResult};
pub use normalize::{classify, entries, normalize, parse_index_body, sort_entries};
pub use types::{
    SnapshotIndex, SnapshotIndexEntry, DEFAULT_SNAPSHOT_EXTENSION, SNAPSHOT_DATE_FORMAT,
};
