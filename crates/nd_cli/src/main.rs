use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nd_client::{DashboardConfig, DashboardEvent, HttpArticleApi, SyncController};
use nd_core::{
    Article, ArticleStore, Clock, DashboardSnapshot, DashboardView, FilterKey, Renderer, SystemClock,
};
use nd_scrapers::{append_progress, http_client, scrapers_for, ScraperManager};
use nd_storage::{assign_missing_ids, create_storage, filter_recent, StorageConfig, StorageKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod duration;
mod logging;
mod terminal;

use duration::HumanDuration;
use terminal::{parse_command, TerminalView, VisibleIds, HELP};

#[derive(Parser, Debug)]
#[command(author, version, about = "News dashboard server and terminal client", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct StorageArgs {
    /// Storage backend: json or memory
    #[arg(long, default_value = "json")]
    storage: String,
    /// Path of the articles file
    #[arg(long, default_value = nd_storage::DEFAULT_STORAGE_PATH)]
    data: PathBuf,
    /// File copied into place when the articles file does not exist yet
    #[arg(long)]
    seed: Option<PathBuf>,
}

impl StorageArgs {
    fn open(&self) -> anyhow::Result<Arc<dyn nd_core::ArticleStorage>> {
        let kind: StorageKind = self.storage.parse()?;
        let mut config = StorageConfig::new(&self.data);
        if let Some(seed) = &self.seed {
            config = config.with_seed(seed);
        }
        Ok(create_storage(kind, config))
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the dashboard page and its API
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Follow a dashboard server from the terminal
    Watch {
        /// Base URL of the dashboard server
        #[arg(long, default_value = nd_client::config::DEFAULT_BASE_URL)]
        url: String,
        /// Background refresh interval (e.g. 60s, 5m, 1h15m)
        #[arg(long, default_value = "60s")]
        interval: HumanDuration,
        /// Initial filter: all, saved or a source name
        #[arg(long, default_value = "all")]
        filter: String,
        /// Request timeout; none by default
        #[arg(long)]
        timeout: Option<HumanDuration>,
        /// How long notifications stay on screen
        #[arg(long, default_value = "3s")]
        notify: HumanDuration,
    },
    /// Fetch the latest articles from the news sources into storage
    Scrape {
        /// Only this source: bensbites or reddit
        #[arg(long)]
        source: Option<String>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1h15m)
        #[arg(long)]
        interval: Option<HumanDuration>,
        /// Markdown file each run is appended to
        #[arg(long)]
        progress: Option<PathBuf>,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Merge articles from a JSON file into storage
    Import {
        /// A JSON array of articles or a snapshot object
        file: PathBuf,
        /// Keep articles older than 24 hours
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Print the stored articles
    List {
        #[arg(long, default_value = "all")]
        filter: String,
        #[command(flatten)]
        storage: StorageArgs,
    },
}

/// Import files hold either a bare list or a full snapshot.
fn parse_import(data: &str) -> anyhow::Result<Vec<Article>> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        let snapshot: DashboardSnapshot = serde_json::from_value(value)?;
        Ok(snapshot.articles)
    }
}

fn spawn_input_reader(tx: mpsc::Sender<DashboardEvent>, visible: VisibleIds) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let ids = visible.lock().map(|ids| ids.clone()).unwrap_or_default();
            match parse_command(&line, &ids) {
                Some(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                None => println!("{}", HELP),
            }
        }
    });
}

fn spawn_interrupt_handler(tx: mpsc::Sender<DashboardEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(DashboardEvent::Quit).await;
        }
    });
}

async fn watch(
    url: String,
    interval: HumanDuration,
    filter: String,
    timeout: Option<HumanDuration>,
    notify: HumanDuration,
) -> anyhow::Result<()> {
    let mut config = DashboardConfig::new(url)
        .with_refresh_interval(interval.0)
        .with_notification_duration(notify.0);
    if let Some(timeout) = timeout {
        config = config.with_request_timeout(timeout.0);
    }
    let api = Arc::new(HttpArticleApi::new(&config)?);
    info!("🔗 Watching {} (refresh every {})", api.base_url(), interval);

    let view = TerminalView::new(std::io::stdout());
    let visible = view.visible_ids();
    let mut controller = SyncController::new(api, view, Renderer::default(), &config);
    controller.dashboard_mut().set_filter(FilterKey::from(filter.as_str()));

    let (tx, rx) = mpsc::channel(32);
    spawn_input_reader(tx.clone(), visible);
    spawn_interrupt_handler(tx);
    println!("{}", HELP);

    controller.run(rx).await;
    Ok(())
}

async fn scrape_once(manager: &ScraperManager, progress: Option<&PathBuf>) -> anyhow::Result<()> {
    let report = manager.run().await?;
    info!(
        "🎉 Scraping complete: {} fetched, {} kept, {} in storage",
        report.fetched, report.kept, report.total
    );
    if let Some(path) = progress {
        let entry = report.progress_entry(SystemClock.now());
        if let Err(e) = append_progress(path, &entry).await {
            warn!("⚠️ Could not log to {}: {}", path.display(), e);
        }
    }
    Ok(())
}

async fn scrape(
    source: Option<String>,
    interval: Option<HumanDuration>,
    progress: Option<PathBuf>,
    storage: &StorageArgs,
) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scrapers = scrapers_for(source.as_deref(), &http_client()?, clock.clone())?;
    let manager = ScraperManager::new(storage.open()?, scrapers, clock);
    info!("🦗 Scrapers initialized: {}", manager.sources().join(", "));

    match interval {
        Some(interval) => {
            info!("Running in periodic mode with {} interval", interval);
            loop {
                info!("Starting scrape cycle");
                if let Err(e) = scrape_once(&manager, progress.as_ref()).await {
                    error!("❌ Error during scrape: {}", e);
                }
                info!("Waiting {} before next scrape", interval);
                tokio::time::sleep(interval.0).await;
            }
        }
        None => scrape_once(&manager, progress.as_ref()).await,
    }
}

async fn list(storage: &StorageArgs, filter: &str) -> anyhow::Result<()> {
    let storage = storage.open()?;
    let mut store = ArticleStore::new();
    store.replace(storage.load_snapshot().await?);

    let renderer = Renderer::default();
    let filter = FilterKey::from(filter);
    let mut view = TerminalView::new(std::io::stdout());
    view.set_active_filter(&filter);
    renderer.render(&mut view, &store, &filter);
    view.update_stats(&renderer.stats(&store, true));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Serve { port, storage } => {
            let backend = storage.open()?;
            info!("💾 Using {} storage at {}", storage.storage, storage.data.display());
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            nd_web::serve(addr, nd_web::AppState::new(backend)).await?;
        }
        Commands::Watch {
            url,
            interval,
            filter,
            timeout,
            notify,
        } => watch(url, interval, filter, timeout, notify).await?,
        Commands::Scrape {
            source,
            interval,
            progress,
            storage,
        } => scrape(source, interval, progress, &storage).await?,
        Commands::Import { file, all, storage } => {
            let data = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let mut articles = parse_import(&data)?;
            assign_missing_ids(&mut articles);
            if !all {
                articles = filter_recent(articles, SystemClock.now());
            }
            if articles.is_empty() {
                warn!("⚠️ No articles in {}", file.display());
                return Ok(());
            }
            let imported = articles.len();
            let total = storage.open()?.store_articles(articles).await?;
            info!("✨ Imported {} articles, {} stored", imported, total);
        }
        Commands::List { filter, storage } => list(&storage, &filter).await?,
    }

    Ok(())
}
