//! # trendview
//!
//! Viewer for a daily trend archive. A publishing job drops one snapshot
//! file per day next to an `index.json` manifest; trendview fetches the
//! manifest, sorts it newest first and renders a static page linking every
//! snapshot.
//!
//! ## Modules
//!
//! - [`location`]: base path resolution for root and sub-path hosting
//! - [`fetch`]: `Fetcher` seam and the `reqwest` implementation
//! - [`snapshot`]: index shapes, normalization and sorting
//! - [`render`]: the page render target and its HTML serialization
//! - [`detail`]: detail panel selection and stale-response handling
//! - [`loader`]: the top-level load with its failure path
//! - [`diagnostics`]: structured diagnostic events and observers
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//! use trendview::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
//!     let loader = IndexLoader::for_location(
//!         "https://user.github.io/trend-archive/",
//!         &config,
//!         fetcher,
//!     )?;
//!
//!     let page = Arc::new(RwLock::new(Page::new(config.page.clone(), &config.messages)));
//!     loader.load(&page).await;
//!
//!     println!("{}", page.read().await.to_html());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detail;
pub mod diagnostics;
pub mod fetch;
pub mod loader;
pub mod location;
pub mod render;
pub mod snapshot;

// Re-export top-level types for convenience
pub use config::{
    generate_default_config, Config, ConfigDiscovery, ConfigError, HttpConfig, LoggingConfig,
    MessagesConfig, PageConfig, SiteConfig,
};

pub use detail::{DetailPanel, DetailState, Generation, Selection, Ticket};

pub use diagnostics::{
    DiagnosticEvent, DiagnosticKind, DiagnosticObserver, RecordingObserver, TracingObserver,
};

pub use fetch::{FetchError, Fetcher, HttpFetcher, MemoryFetcher, MemoryResponse};

pub use loader::{DetailOutcome, IndexLoader, LoadOutcome, SharedPage};

pub use location::{file_url, index_url, parse_location, resolve_base, LocationError};

pub use render::{render_rows, Layout, Page, RenderedRow, Status, StatusKind};

pub use snapshot::{
    normalize, sort_entries, IndexError, IndexResult, SnapshotIndex, SnapshotIndexEntry,
};
