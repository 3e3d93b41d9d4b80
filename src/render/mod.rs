//! Page Rendering
//!
//! The page is the render target: a status region, a row region and a
//! detail panel, each addressed by an element id supplied by the page
//! shell. Rows are always replaced as a whole, never patched.

mod html;

pub use html::escape;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::config::{MessagesConfig, PageConfig};
use crate::detail::{DetailPanel, Generation, Ticket};
use crate::location::file_url;
use crate::snapshot::SnapshotIndexEntry;

/// How rows are laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<ul>` of links
    #[default]
    List,
    /// Date / Source / Count table
    Table,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(Layout::List),
            "table" => Ok(Layout::Table),
            other => Err(format!("unknown layout {:?} (expected list or table)", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::List => f.write_str("list"),
            Layout::Table => f.write_str("table"),
        }
    }
}

/// One rendered row, projected from an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub date: String,
    pub source: Option<String>,
    pub count: Option<u64>,
    /// Snapshot file name, derived from the date when absent
    pub file: String,
    /// Absolute link to the snapshot file
    pub href: String,
}

impl RenderedRow {
    /// Source label, or `placeholder` when the entry had none
    pub fn source_label<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.source.as_deref().unwrap_or(placeholder)
    }

    /// Count with its unit, or `placeholder` when the entry had none
    pub fn count_label(&self, unit: &str, placeholder: &str) -> String {
        match self.count {
            Some(count) if unit.is_empty() => count.to_string(),
            Some(count) => format!("{} {}", count, unit),
            None => placeholder.to_string(),
        }
    }
}

/// Project sorted entries into rows, one per entry
pub fn render_rows(
    entries: &[SnapshotIndexEntry],
    base: &Url,
    data_dir: &str,
) -> Vec<RenderedRow> {
    entries
        .iter()
        .filter_map(|entry| {
            let file = entry.file_name();
            match file_url(base, data_dir, &file) {
                Ok(href) => Some(RenderedRow {
                    date: entry.date.clone(),
                    source: entry.source.clone().filter(|s| !s.is_empty()),
                    count: entry.count,
                    file,
                    href: href.to_string(),
                }),
                Err(e) => {
                    tracing::warn!(
                        date = %entry.date,
                        error = %e,
                        "Skipping row without a valid link"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Kind of status shown in the status region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Empty,
    Error,
}

/// Status region content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

/// The render target
#[derive(Debug)]
pub struct Page {
    config: PageConfig,
    count_label: String,
    loads: Generation,
    status: Option<Status>,
    rows: Vec<RenderedRow>,
    detail: DetailPanel,
    rendered_at: Option<DateTime<Utc>>,
}

impl Page {
    pub fn new(config: PageConfig, messages: &MessagesConfig) -> Self {
        Self {
            config,
            count_label: messages.count_label.clone(),
            loads: Generation::new(),
            status: None,
            rows: Vec::new(),
            detail: DetailPanel::new(),
            rendered_at: None,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Start a load: supersede earlier loads and show the loading status
    pub fn begin_load(&mut self, loading_message: &str) -> Ticket {
        let ticket = self.loads.advance();
        self.set_status(StatusKind::Loading, loading_message);
        ticket
    }

    /// Whether `ticket` belongs to the most recently started load
    pub fn is_current_load(&self, ticket: Ticket) -> bool {
        self.loads.is_current(ticket)
    }

    pub fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(Status {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Replace every row; earlier rows and detail selection are discarded
    pub fn replace_rows(&mut self, rows: Vec<RenderedRow>) {
        self.rows = rows;
        self.detail.clear();
        self.rendered_at = Some(Utc::now());
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut DetailPanel {
        &mut self.detail
    }

    /// Serialize the page as a complete HTML document
    pub fn to_html(&self) -> String {
        html::document(self)
    }
}
