use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use win11_cpus::apis::intel::IntelCatalog;
use win11_cpus::app::lookup_use_case::LookupUseCase;
use win11_cpus::app::reconcile_use_case::{ReconcileReport, ReconcileUseCase};
use win11_cpus::app::scrape_use_case::ScrapeUseCase;
use win11_cpus::config::{Config, DEFAULT_CONFIG_PATH};
use win11_cpus::constants::EXPORT_METRICS_FILENAME;
use win11_cpus::infra::http_client::ReqwestHttp;
use win11_cpus::observability::{init_logging, install_recorder};
use win11_cpus::storage::StagingStore;
use win11_cpus::MatchEvent;

#[derive(Parser)]
#[command(name = "win11_cpus")]
#[command(about = "Windows 11 supported CPU scraper")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and stage the compatibility lists and vendor catalogs
    Scrape {
        /// Fetch again even if staged data exists
        #[arg(long)]
        force: bool,
    },
    /// Reconcile the staged data and export the merged records
    Reconcile,
    /// Run scrape and reconcile sequentially
    Run {
        /// Fetch again even if staged data exists
        #[arg(long)]
        force: bool,
    },
    /// Look every Intel compatibility entry up through the ARK search
    Lookup,
}

async fn scrape(config: &Config, store: &StagingStore, force: bool) -> Result<()> {
    let http = Arc::new(ReqwestHttp::new(&config.sources)?);
    let use_case = ScrapeUseCase::from_config(http, &config.sources, store.clone());
    let (lists, catalogs) = use_case.run(force).await.context("Scrape failed")?;

    println!("\n🕷️  Scrape results:");
    println!("   Compatibility lists: {}", lists.len());
    for (vendor, entries) in &catalogs {
        println!("   {} catalog: {} CPUs", vendor, entries.len());
    }
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    println!("\n📊 Reconciliation results:");
    for summary in report.reconciliation.summary() {
        println!(
            "   {}: {} CPUs, {} compatible, {} without launch date",
            summary.vendor, summary.catalog_entries, summary.compatible, summary.undated
        );
    }

    let review: Vec<&MatchEvent> = report.reconciliation.review_events().collect();
    if !review.is_empty() {
        println!("\n⚠️  {} entries need review:", review.len());
        for event in review {
            match event {
                MatchEvent::NotFound { vendor, brand, fragment } => {
                    println!("   - not found in {}: {} {}", vendor, brand, fragment);
                }
                MatchEvent::Ambiguous { vendor, fragment, titles, .. } => {
                    println!(
                        "   - ambiguous in {}: {} -> {}",
                        vendor,
                        fragment,
                        titles.join(" | ")
                    );
                }
                _ => {}
            }
        }
    }

    println!("\n📁 Exported:");
    for path in &report.exported {
        println!("   {}", path.display());
    }
}

fn reconcile(config: &Config, store: &StagingStore) -> Result<()> {
    let use_case =
        ReconcileUseCase::with_default_reconciler(store.clone(), config.export.output_dir.clone());
    let report = use_case.run().context("Reconciliation failed")?;
    print_report(&report);
    Ok(())
}

async fn lookup(config: &Config, store: &StagingStore) -> Result<()> {
    let lists = store.load_compatibility_lists()?;
    let http = Arc::new(ReqwestHttp::new(&config.sources)?);
    let intel = IntelCatalog::new(
        http,
        config.sources.intel_processors_url.clone(),
        config.sources.intel_search_url.clone(),
    );
    let results = LookupUseCase::new(intel).run(&lists).await;
    let found = results.iter().filter(|r| r.found.is_some()).count();
    println!("\n🔎 Lookup: {} of {} Intel CPUs found", found, results.len());
    Ok(())
}

fn write_metrics_snapshot(output_dir: &Path, rendered: String) {
    let path = output_dir.join(EXPORT_METRICS_FILENAME);
    if let Err(e) = fs::create_dir_all(output_dir).and_then(|_| fs::write(&path, rendered)) {
        warn!("Failed to write metrics snapshot {}: {}", path.display(), e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let _log_guard = init_logging(&config.storage.log_dir);
    if cli.config.exists() {
        info!("Loaded configuration from {}", cli.config.display());
    } else {
        info!("No config file at {}, using defaults", cli.config.display());
    }
    let metrics = match install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    let store = StagingStore::new(config.storage.data_dir.clone());
    info!("Staging data in {}", store.data_dir().display());

    let result = match cli.command {
        Commands::Scrape { force } => scrape(&config, &store, force).await,
        Commands::Reconcile => reconcile(&config, &store),
        Commands::Run { force } => match scrape(&config, &store, force).await {
            Ok(()) => reconcile(&config, &store),
            Err(e) => Err(e),
        },
        Commands::Lookup => lookup(&config, &store).await,
    };

    if let Some(handle) = metrics {
        write_metrics_snapshot(&config.export.output_dir, handle.render());
    }
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
