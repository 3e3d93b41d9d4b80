//! Index Loader
//!
//! Top level of a page load:
//!
//! ```text
//!   begin_load → GET <base>/data/index.json → classify → normalize → sort
//!     → render rows → (optional) select newest snapshot into the detail panel
//! ```
//!
//! Every failure is handled here. The page always leaves the loading state
//! with exactly one status message, and the structured cause goes to the
//! diagnostic observer.

use reqwest::Url;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::{Config, MessagesConfig, SiteConfig};
use crate::detail::{DetailState, Selection, Ticket};
use crate::diagnostics::{DiagnosticEvent, DiagnosticKind, DiagnosticObserver, TracingObserver};
use crate::fetch::{FetchError, Fetcher};
use crate::location::{self, LocationError};
use crate::render::{render_rows, Page, StatusKind};
use crate::snapshot::{self, IndexError, IndexResult, SnapshotIndex, SnapshotIndexEntry};

/// Page shared between the loader and whoever displays it
pub type SharedPage = Arc<RwLock<Page>>;

/// Result of one load, as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were rendered
    Rendered { rows: usize },
    /// Index is valid but empty
    Empty,
    /// Load failed; the page shows the matching message
    Failed(DiagnosticKind),
    /// A newer load started before this one finished; the page was not touched
    Superseded,
}

/// Result of selecting a snapshot for the detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Loaded,
    Failed,
    /// A newer selection superseded this one; the response was discarded
    Stale,
    /// No row at that position
    NoSuchRow,
}

/// Fetches the index and renders it into a page
pub struct IndexLoader {
    base: Url,
    site: SiteConfig,
    messages: MessagesConfig,
    fetcher: Arc<dyn Fetcher>,
    observer: Arc<dyn DiagnosticObserver>,
}

impl IndexLoader {
    /// Create a loader for an already resolved base URL
    pub fn new(
        base: Url,
        site: SiteConfig,
        messages: MessagesConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            base,
            site,
            messages,
            fetcher,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a loader for the page at `location`
    pub fn for_location(
        location: &str,
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, LocationError> {
        let page_url = location::parse_location(location)?;
        let base = location::resolve_base(&page_url);
        tracing::debug!(%page_url, %base, "Resolved base path");

        Ok(Self::new(
            base,
            config.site.clone(),
            config.messages.clone(),
            fetcher,
        ))
    }

    /// Builder method: report diagnostics to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn DiagnosticObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of the index document
    pub fn index_url(&self) -> Result<Url, LocationError> {
        location::index_url(&self.base, &self.site.data_dir, &self.site.index_file)
    }

    /// URL of a snapshot file
    pub fn file_url(&self, file: &str) -> Result<Url, LocationError> {
        location::file_url(&self.base, &self.site.data_dir, file)
    }

    /// Fetch and classify the index document
    pub async fn load_index(&self, url: &Url) -> IndexResult<SnapshotIndex> {
        let body = self.fetcher.get_text(url).await?;
        snapshot::parse_index_body(&body)
    }

    /// Fetch the index and return its entries newest first
    pub async fn load_entries(&self, url: &Url) -> IndexResult<Vec<SnapshotIndexEntry>> {
        let index = self.load_index(url).await?;
        let mut entries = snapshot::entries(&index);
        snapshot::sort_entries(&mut entries);

        for entry in entries.iter().filter(|e| !e.is_iso_date()) {
            tracing::warn!(
                date = %entry.date,
                "Snapshot date is not YYYY-MM-DD; ordering may be off"
            );
        }

        tracing::debug!(shape = index.shape(), entries = entries.len(), "Index normalized");
        Ok(entries)
    }

    /// Fetch one snapshot file as opaque text
    pub async fn fetch_snapshot(&self, entry: &SnapshotIndexEntry) -> Result<String, FetchError> {
        let url = self.file_url(&entry.file_name()).map_err(|e| FetchError::Network {
            url: entry.file_name(),
            cause: e.to_string(),
        })?;
        self.fetcher.get_text(&url).await
    }

    /// Load the index into `page`.
    ///
    /// Earlier rows are always discarded. Never fails: every error ends as
    /// a status message plus a diagnostic event.
    pub async fn load(&self, page: &SharedPage) -> LoadOutcome {
        let load_id = Uuid::new_v4();
        let ticket = page.write().await.begin_load(&self.messages.loading);

        let (url, result) = match self.index_url() {
            Ok(url) => {
                let result = self.load_entries(&url).await;
                (url.to_string(), result)
            }
            Err(e) => (
                self.base.to_string(),
                Err(IndexError::Fetch(FetchError::Network {
                    url: self.base.to_string(),
                    cause: e.to_string(),
                })),
            ),
        };

        let (outcome, eager) = {
            let mut page = page.write().await;
            if !page.is_current_load(ticket) {
                tracing::debug!(%load_id, "Load superseded; page left to the newer load");
                return LoadOutcome::Superseded;
            }
            let outcome = self.apply(&mut page, load_id, &url, result);

            // Select under the same guard, so a newer load can only supersede it
            let eager = match outcome {
                LoadOutcome::Rendered { .. } if page.config().eager_detail => {
                    Self::begin_select(&mut page, 0)
                }
                _ => None,
            };
            (outcome, eager)
        };

        if let Some((ticket, selection)) = eager {
            self.finish_select(page, ticket, selection).await;
        }

        outcome
    }

    fn apply(
        &self,
        page: &mut Page,
        load_id: Uuid,
        url: &str,
        result: IndexResult<Vec<SnapshotIndexEntry>>,
    ) -> LoadOutcome {
        match result {
            Ok(entries) if entries.is_empty() => {
                page.replace_rows(Vec::new());
                page.set_status(StatusKind::Empty, &self.messages.empty);
                self.observer.observe(&DiagnosticEvent::new(
                    load_id,
                    DiagnosticKind::EmptyIndex,
                    url,
                ));
                LoadOutcome::Empty
            }
            Ok(entries) => {
                let rows = render_rows(&entries, &self.base, &self.site.data_dir);
                let count = rows.len();
                page.replace_rows(rows);
                page.clear_status();
                tracing::info!(%load_id, rows = count, "Snapshot index rendered");
                LoadOutcome::Rendered { rows: count }
            }
            Err(err) => {
                let messages = &self.messages;
                let (kind, message, status) = match &err {
                    IndexError::Fetch(e) => {
                        (DiagnosticKind::Fetch, &messages.fetch_failed, e.status())
                    }
                    IndexError::Parse(_) => (DiagnosticKind::Parse, &messages.parse_failed, None),
                    IndexError::Schema(_) => {
                        (DiagnosticKind::Schema, &messages.schema_failed, None)
                    }
                };
                page.replace_rows(Vec::new());
                page.set_status(StatusKind::Error, message);
                self.observer.observe(
                    &DiagnosticEvent::new(load_id, kind, url)
                        .status(status)
                        .cause(err.to_string()),
                );
                LoadOutcome::Failed(kind)
            }
        }
    }

    /// Show the snapshot of row `index` in the detail panel.
    ///
    /// Supersedes any earlier selection. The response is applied only if
    /// no newer selection was made while it was in flight.
    pub async fn select(&self, page: &SharedPage, index: usize) -> DetailOutcome {
        let selected = Self::begin_select(&mut *page.write().await, index);
        match selected {
            Some((ticket, selection)) => self.finish_select(page, ticket, selection).await,
            None => DetailOutcome::NoSuchRow,
        }
    }

    /// Register row `index` as the current selection
    fn begin_select(page: &mut Page, index: usize) -> Option<(Ticket, Selection)> {
        let row = page.rows().get(index).cloned()?;
        let selection = Selection {
            date: row.date,
            file: row.file,
            href: row.href,
        };
        Some((page.detail_mut().select(selection.clone()), selection))
    }

    /// Fetch the selected snapshot and apply it if still current
    async fn finish_select(
        &self,
        page: &SharedPage,
        ticket: Ticket,
        selection: Selection,
    ) -> DetailOutcome {
        let result = match Url::parse(&selection.href) {
            Ok(url) => self.fetcher.get_text(&url).await,
            Err(e) => Err(FetchError::Network {
                url: selection.href.clone(),
                cause: e.to_string(),
            }),
        };

        let mut page = page.write().await;
        let (state, failed) = match result {
            Ok(text) => (DetailState::Loaded(text), false),
            Err(err) => {
                let event = DiagnosticEvent::new(
                    Uuid::new_v4(),
                    DiagnosticKind::DetailFetch,
                    &selection.href,
                )
                .status(err.status())
                .cause(err.to_string());
                self.observer.observe(&event);
                (DetailState::Failed(self.messages.detail_failed.clone()), true)
            }
        };

        if !page.detail_mut().resolve(ticket, state) {
            tracing::debug!(date = %selection.date, "Discarded stale snapshot response");
            return DetailOutcome::Stale;
        }

        if failed {
            DetailOutcome::Failed
        } else {
            DetailOutcome::Loaded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::diagnostics::RecordingObserver;
    use crate::fetch::MemoryFetcher;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    const BASE: &str = "https://user.github.io/trend-archive/";
    const INDEX: &str = "https://user.github.io/trend-archive/data/index.json";

    fn new_page(eager_detail: bool) -> SharedPage {
        let config = PageConfig {
            eager_detail,
            ..PageConfig::default()
        };
        Arc::new(RwLock::new(Page::new(config, &MessagesConfig::default())))
    }

    fn loader(fetcher: Arc<dyn Fetcher>) -> (IndexLoader, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let loader = IndexLoader::for_location(
            "https://user.github.io/trend-archive/index.html",
            &Config::default(),
            fetcher,
        )
        .unwrap()
        .with_observer(observer.clone());
        (loader, observer)
    }

    #[tokio::test]
    async fn test_load_renders_newest_first() {
        let fetcher = MemoryFetcher::new().body(
            INDEX,
            r#"[{"date":"2024-01-01","file":"a.md","count":3},
                {"date":"2024-02-01","file":"b.md","count":5}]"#,
        );
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(false);

        assert_eq!(loader.load(&page).await, LoadOutcome::Rendered { rows: 2 });

        let page = page.read().await;
        let rows = page.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-02-01");
        assert_eq!(rows[0].href, format!("{}data/b.md", BASE));
        assert_eq!(rows[0].count, Some(5));
        assert_eq!(rows[1].href, format!("{}data/a.md", BASE));
        assert!(page.status().is_none());
        assert!(observer.events().is_empty());
    }

    #[tokio::test]
    async fn test_load_empty_index() {
        let fetcher = MemoryFetcher::new().body(INDEX, "[]");
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(true);

        assert_eq!(loader.load(&page).await, LoadOutcome::Empty);

        let page = page.read().await;
        assert!(page.rows().is_empty());
        let status = page.status().unwrap();
        assert_eq!(status.kind, StatusKind::Empty);
        assert_eq!(status.message, MessagesConfig::default().empty);
        assert_eq!(observer.last().unwrap().kind, DiagnosticKind::EmptyIndex);
    }

    #[tokio::test]
    async fn test_load_http_404() {
        let fetcher = MemoryFetcher::new().status(INDEX, 404);
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(true);

        assert_eq!(
            loader.load(&page).await,
            LoadOutcome::Failed(DiagnosticKind::Fetch)
        );

        let page = page.read().await;
        assert_eq!(page.status().unwrap().kind, StatusKind::Error);
        assert_eq!(
            page.status().unwrap().message,
            MessagesConfig::default().fetch_failed
        );

        let event = observer.last().unwrap();
        assert_eq!(event.kind, DiagnosticKind::Fetch);
        assert_eq!(event.status, Some(404));
        assert_eq!(event.url, INDEX);
    }

    #[tokio::test]
    async fn test_load_network_failure() {
        let fetcher = MemoryFetcher::new().unreachable(INDEX, "connection reset");
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(true);

        assert_eq!(
            loader.load(&page).await,
            LoadOutcome::Failed(DiagnosticKind::Fetch)
        );
        let event = observer.last().unwrap();
        assert_eq!(event.status, None);
        assert!(event.cause.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_load_malformed_json() {
        let fetcher = MemoryFetcher::new().body(INDEX, "[{\"date\": \"2024-01-01\"");
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(true);

        assert_eq!(
            loader.load(&page).await,
            LoadOutcome::Failed(DiagnosticKind::Parse)
        );

        let page = page.read().await;
        assert!(page.rows().is_empty());
        assert_eq!(
            page.status().unwrap().message,
            MessagesConfig::default().parse_failed
        );
        assert_eq!(observer.last().unwrap().kind, DiagnosticKind::Parse);
    }

    #[tokio::test]
    async fn test_load_wrong_shape() {
        let fetcher = MemoryFetcher::new().body(INDEX, r#"{"snapshots": []}"#);
        let (loader, _observer) = loader(Arc::new(fetcher));
        let page = new_page(true);

        assert_eq!(
            loader.load(&page).await,
            LoadOutcome::Failed(DiagnosticKind::Schema)
        );
        assert_eq!(
            page.read().await.status().unwrap().message,
            MessagesConfig::default().schema_failed
        );
    }

    #[tokio::test]
    async fn test_load_days_shape_derives_files() {
        let fetcher = MemoryFetcher::new().body(INDEX, r#"{"days": ["2024-03-04", "2024-03-05"]}"#);
        let (loader, _observer) = loader(Arc::new(fetcher));
        let page = new_page(false);

        loader.load(&page).await;

        let page = page.read().await;
        assert_eq!(page.rows()[0].href, format!("{}data/2024-03-05.md", BASE));
        assert_eq!(page.rows()[0].count, None);
    }

    #[tokio::test]
    async fn test_reload_does_not_accumulate() {
        let fetcher = MemoryFetcher::new().body(
            INDEX,
            r#"[{"date":"2024-01-01"},{"date":"2024-01-02"},{"date":"2024-01-03"}]"#,
        );
        let (loader, _observer) = loader(Arc::new(fetcher.clone()));
        let page = new_page(false);

        loader.load(&page).await;
        loader.load(&page).await;
        assert_eq!(page.read().await.rows().len(), 3);

        // A failing reload clears the old rows too
        fetcher.set(INDEX, crate::fetch::MemoryResponse::Status(500));
        loader.load(&page).await;
        assert!(page.read().await.rows().is_empty());
    }

    #[tokio::test]
    async fn test_load_fetches_newest_detail() {
        let fetcher = MemoryFetcher::new()
            .body(INDEX, r#"[{"date":"2024-01-01"},{"date":"2024-01-02"}]"#)
            .body(
                format!("{}data/2024-01-02.md", BASE),
                "# 2024-01-02\n\n- trend",
            );
        let (loader, _observer) = loader(Arc::new(fetcher.clone()));
        let page = new_page(true);

        loader.load(&page).await;

        let page = page.read().await;
        assert_eq!(page.detail().selection().unwrap().date, "2024-01-02");
        assert_eq!(
            page.detail().state(),
            Some(&DetailState::Loaded("# 2024-01-02\n\n- trend".to_string()))
        );
        assert_eq!(
            fetcher.requests(),
            vec![INDEX.to_string(), format!("{}data/2024-01-02.md", BASE)]
        );
    }

    #[tokio::test]
    async fn test_select_failure_and_missing_row() {
        let fetcher = MemoryFetcher::new().body(INDEX, r#"[{"date":"2024-01-01"}]"#);
        let (loader, observer) = loader(Arc::new(fetcher));
        let page = new_page(false);

        loader.load(&page).await;
        assert_eq!(loader.select(&page, 5).await, DetailOutcome::NoSuchRow);
        assert_eq!(loader.select(&page, 0).await, DetailOutcome::Failed);

        let event = observer.last().unwrap();
        assert_eq!(event.kind, DiagnosticKind::DetailFetch);
        assert_eq!(event.status, Some(404));
        assert_eq!(
            page.read().await.detail().state(),
            Some(&DetailState::Failed(MessagesConfig::default().detail_failed))
        );
    }

    /// Holds the first request for `gated` until released
    struct GatedFetcher {
        inner: MemoryFetcher,
        gated: String,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl GatedFetcher {
        fn new(inner: MemoryFetcher, gated: impl Into<String>) -> (Self, oneshot::Sender<()>) {
            let (tx, rx) = oneshot::channel();
            let fetcher = Self {
                inner,
                gated: gated.into(),
                gate: Mutex::new(Some(rx)),
            };
            (fetcher, tx)
        }
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
            let gate = if url.as_str() == self.gated {
                let mut slot = self.gate.lock().unwrap();
                slot.take()
            } else {
                None
            };
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.get_text(url).await
        }
    }

    #[tokio::test]
    async fn test_stale_detail_response_discarded() {
        let first = format!("{}data/2024-01-02.md", BASE);
        let inner = MemoryFetcher::new()
            .body(INDEX, r#"[{"date":"2024-01-01"},{"date":"2024-01-02"}]"#)
            .body(first.clone(), "newest")
            .body(format!("{}data/2024-01-01.md", BASE), "older");
        let (fetcher, release) = GatedFetcher::new(inner, first);
        let (loader, _observer) = loader(Arc::new(fetcher));
        let loader = Arc::new(loader);
        let page = new_page(false);

        loader.load(&page).await;

        let pending = {
            let loader = loader.clone();
            let page = page.clone();
            tokio::spawn(async move { loader.select(&page, 0).await })
        };
        // Let the first selection register before superseding it
        while page.read().await.detail().selection().is_none() {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.select(&page, 1).await, DetailOutcome::Loaded);
        release.send(()).unwrap();
        assert_eq!(pending.await.unwrap(), DetailOutcome::Stale);

        let page = page.read().await;
        assert_eq!(page.detail().selection().unwrap().date, "2024-01-01");
        assert_eq!(
            page.detail().state(),
            Some(&DetailState::Loaded("older".to_string()))
        );
    }

    #[tokio::test]
    async fn test_superseded_load_leaves_page_alone() {
        let inner = MemoryFetcher::new().body(INDEX, r#"[{"date":"2024-01-01"}]"#);
        let (fetcher, release) = GatedFetcher::new(inner, INDEX);
        let (loader, _observer) = loader(Arc::new(fetcher));
        let loader = Arc::new(loader);
        let page = new_page(false);

        let pending = {
            let loader = loader.clone();
            let page = page.clone();
            tokio::spawn(async move { loader.load(&page).await })
        };
        while page.read().await.status().is_none() {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.load(&page).await, LoadOutcome::Rendered { rows: 1 });
        release.send(()).unwrap();
        assert_eq!(pending.await.unwrap(), LoadOutcome::Superseded);
        assert_eq!(page.read().await.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_eager_detail_of_superseded_load_discarded() {
        let newest = format!("{}data/2024-01-02.md", BASE);
        let inner = MemoryFetcher::new()
            .body(INDEX, r#"[{"date":"2024-01-01"},{"date":"2024-01-02"}]"#)
            .body(newest.clone(), "from the first load");
        let (fetcher, release) = GatedFetcher::new(inner.clone(), newest);
        let (loader, _observer) = loader(Arc::new(fetcher));
        let loader = Arc::new(loader);
        let page = new_page(true);

        let pending = {
            let loader = loader.clone();
            let page = page.clone();
            tokio::spawn(async move { loader.load(&page).await })
        };
        // Rows and the eager selection appear together
        loop {
            let page = page.read().await;
            if !page.rows().is_empty() {
                assert_eq!(page.detail().selection().unwrap().date, "2024-01-02");
                break;
            }
            drop(page);
            tokio::task::yield_now().await;
        }

        inner.set(INDEX, crate::fetch::MemoryResponse::Body("[]".to_string()));
        assert_eq!(loader.load(&page).await, LoadOutcome::Empty);
        release.send(()).unwrap();
        assert_eq!(pending.await.unwrap(), LoadOutcome::Rendered { rows: 2 });

        let page = page.read().await;
        assert!(page.rows().is_empty());
        assert!(page.detail().selection().is_none());
        assert_eq!(page.status().unwrap().kind, StatusKind::Empty);
        assert!(!page.to_html().contains("from the first load"));
    }
}
