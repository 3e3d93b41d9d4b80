//! trendview CLI
//!
//! Command-line interface for the trend archive viewer:
//! - Render the archive page
//! - List snapshots
//! - Show one snapshot
//! - Generate a config file

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendview::{
    generate_default_config, Config, HttpFetcher, IndexLoader, Layout, LoadOutcome,
    LoggingConfig, Page, SnapshotIndexEntry,
};

#[derive(Parser)]
#[command(name = "trendview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render the daily trend snapshot archive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the archive page as HTML
    Render {
        /// Page location, e.g. https://user.github.io/trend-archive/
        #[arg(short, long)]
        location: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Row layout (list, table)
        #[arg(long)]
        layout: Option<Layout>,
        /// Do not load the newest snapshot into the detail panel
        #[arg(long)]
        no_detail: bool,
    },

    /// List snapshots, newest first
    List {
        /// Page location
        #[arg(short, long)]
        location: Option<String>,
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print one snapshot
    Show {
        /// Snapshot date (YYYY-MM-DD)
        date: String,
        /// Page location
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Search quietly; the outcome is logged once logging is configured
    let (config, discovery) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, None),
        None => {
            let discovery = Config::discover(&Config::default_paths());
            (discovery.config.clone(), Some(discovery))
        }
    };
    init_logging(&config.logging);
    if let Some(discovery) = &discovery {
        discovery.log();
    }

    match cli.command {
        Commands::Render {
            location,
            output,
            layout,
            no_detail,
        } => {
            let mut config = config;
            if let Some(layout) = layout {
                config.page.layout = layout;
            }
            if no_detail {
                config.page.eager_detail = false;
            }

            let loader = build_loader(&config, location)?;
            let page = Arc::new(RwLock::new(Page::new(
                config.page.clone(),
                &config.messages,
            )));

            let outcome = loader.load(&page).await;
            tracing::info!(?outcome, base = %loader.base(), "Page rendered");

            let html = page.read().await.to_html();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Page written to {:?} ({})", path, describe(outcome));
                }
                None => print!("{}", html),
            }
        }

        Commands::List { location, format } => {
            let loader = build_loader(&config, location)?;
            let url = loader.index_url()?;
            let entries = loader
                .load_entries(&url)
                .await
                .with_context(|| format!("Failed to load {}", url))?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
                "table" => print_table(&entries, &config.page.placeholder),
                other => bail!("Unknown format {:?} (expected table or json)", other),
            }
        }

        Commands::Show { date, location } => {
            let loader = build_loader(&config, location)?;
            let url = loader.index_url()?;
            let entries = loader
                .load_entries(&url)
                .await
                .with_context(|| format!("Failed to load {}", url))?;

            let entry = entries
                .iter()
                .find(|e| e.date == date)
                .ok_or_else(|| anyhow!("No snapshot for {}", date))?;

            let text = loader.fetch_snapshot(entry).await?;
            print!("{}", text);
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("trendview={}", logging.level))
    });

    // Logs go to stderr; stdout carries the page
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_loader(config: &Config, location: Option<String>) -> anyhow::Result<IndexLoader> {
    let location = location
        .or_else(|| config.site.location.clone())
        .ok_or_else(|| anyhow!("No page location; pass --location or set site.location"))?;

    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    Ok(IndexLoader::for_location(&location, config, fetcher)?)
}

fn describe(outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Rendered { rows } => format!("{} snapshots", rows),
        LoadOutcome::Empty => "no snapshots".to_string(),
        LoadOutcome::Failed(kind) => format!("{} failure", kind),
        LoadOutcome::Superseded => "superseded".to_string(),
    }
}

fn print_table(entries: &[SnapshotIndexEntry], placeholder: &str) {
    if entries.is_empty() {
        println!("No snapshots");
        return;
    }

    println!("{:<12} {:<24} {:>6}  {}", "DATE", "SOURCE", "COUNT", "FILE");
    println!("{}", "-".repeat(60));
    for entry in entries {
        println!(
            "{:<12} {:<24} {:>6}  {}",
            entry.date,
            entry.source.as_deref().unwrap_or(placeholder),
            entry
                .count
                .map(|c| c.to_string())
                .unwrap_or_else(|| placeholder.to_string()),
            entry.file_name()
        );
    }
}
