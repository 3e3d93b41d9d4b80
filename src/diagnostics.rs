//! Diagnostics
//!
//! Failures are reported as structured events (kind, URL, cause) to an
//! injectable observer instead of being printed. The binary installs
//! [`TracingObserver`]; tests install [`RecordingObserver`] and assert on
//! what was reported.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

/// What went wrong (or, for `EmptyIndex`, what was found)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Index request failed (network or HTTP status)
    Fetch,
    /// Index body is not valid JSON
    Parse,
    /// Index JSON has an unexpected shape
    Schema,
    /// Index is valid but lists no snapshots
    EmptyIndex,
    /// Snapshot detail request failed
    DetailFetch,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Fetch => "fetch",
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Schema => "schema",
            DiagnosticKind::EmptyIndex => "empty_index",
            DiagnosticKind::DetailFetch => "detail_fetch",
        }
    }

    /// Whether the event describes a failure
    pub fn is_error(&self) -> bool {
        !matches!(self, DiagnosticKind::EmptyIndex)
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured diagnostic event
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    /// Load that produced the event
    pub load_id: Uuid,
    pub kind: DiagnosticKind,
    /// URL that was attempted
    pub url: String,
    /// HTTP status, when the server answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Underlying cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticEvent {
    pub fn new(load_id: Uuid, kind: DiagnosticKind, url: impl Into<String>) -> Self {
        Self {
            load_id,
            kind,
            url: url.into(),
            status: None,
            cause: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder method: set HTTP status
    pub fn status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    /// Builder method: set cause
    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Receives diagnostic events
pub trait DiagnosticObserver: Send + Sync {
    fn observe(&self, event: &DiagnosticEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DiagnosticObserver for TracingObserver {
    fn observe(&self, event: &DiagnosticEvent) {
        let cause = event.cause.as_deref().unwrap_or("");
        if event.kind.is_error() {
            tracing::error!(
                load_id = %event.load_id,
                kind = %event.kind,
                url = %event.url,
                status = ?event.status,
                cause,
                "Snapshot fetch failed"
            );
        } else {
            tracing::info!(
                load_id = %event.load_id,
                kind = %event.kind,
                url = %event.url,
                "Snapshot index is empty"
            );
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events observed so far, oldest first
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Most recent event
    pub fn last(&self) -> Option<DiagnosticEvent> {
        self.events
            .lock()
            .ok()
            .and_then(|events| events.last().cloned())
    }
}

impl DiagnosticObserver for RecordingObserver {
    fn observe(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
