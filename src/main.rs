// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod normalize;
mod candidates;
mod probe;
mod resolver;
mod record;
mod registry;
mod places;
mod enrich;
mod batch;
mod input;
mod export;
mod config;
mod cli;

use cli::{Cli, Commands, OutputFormat, RunOptions};
use config::AppConfig;
use enrich::Enricher;
use places::PlacesClient;
use probe::ExistenceProbe;
use registry::{RegistryClient, RegistryQuery};
use resolver::{SiteResolution, SiteResolver};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file may carry the places API key during development.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(message) = cli.validate() {
        eprintln!("❌ {message}");
        std::process::exit(2);
    }

    init_logging(cli.verbose);

    // Handle init-config before loading: it must work without a config file.
    if matches!(cli.command, Commands::InitConfig) {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run siteprospector again.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {e}");
                std::process::exit(1);
            }
        }
    }

    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Search {
            sector,
            city,
            postal_code,
            category,
            limit,
            enrich,
            list_only,
            run,
        } => {
            let query = RegistryQuery {
                sector,
                city,
                postal_code,
                category,
                limit,
                page: 1,
            };
            run_search(&config, query, enrich, list_only, &run).await
        }
        Commands::Check { input, run } => run_check(&config, &input, &run).await,
        Commands::Enrich { input, run } => run_enrich(&config, &input, &run).await,
        Commands::Resolve { name } => run_resolve(&config, &name).await,
        // Handled before configuration loading.
        Commands::InitConfig => Ok(()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // RUST_LOG wins when set, -v/-vv otherwise.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("siteprospector={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_search(
    config: &AppConfig,
    query: RegistryQuery,
    enrich: bool,
    list_only: bool,
    run: &RunOptions,
) -> Result<()> {
    let client = RegistryClient::with_base_url(
        config.http.api_timeout(),
        &config.http.user_agent,
        &config.registry.base_url,
    )
    .context("failed to build the registry client")?;

    let page = client
        .search(&query)
        .await
        .context("registry search failed")?;

    println!(
        "Found {} businesses ({} total matches on the registry)",
        page.businesses.len(),
        page.total_results
    );

    if page.businesses.is_empty() {
        return Ok(());
    }

    if list_only {
        for business in &page.businesses {
            println!(
                "  {}  {}  {}",
                business.name,
                business.city.as_deref().unwrap_or("-"),
                business.siret.as_deref().unwrap_or("-")
            );
        }
        return Ok(());
    }

    let workers = run.parallel.unwrap_or(config.batch.max_workers);
    let report = if enrich {
        let enricher = build_enricher(config, run.timeout)?;
        batch::run_enrichment(&enricher, page.businesses, workers).await
    } else {
        let resolver = build_resolver(config, run.timeout)?;
        batch::run_site_checks(&resolver, page.businesses, workers).await
    };

    finish_run(report, run)
}

async fn run_check(config: &AppConfig, input: &Path, run: &RunOptions) -> Result<()> {
    let records = input::load_business_file(input)?;
    info!(count = records.len(), "loaded business list");

    let resolver = build_resolver(config, run.timeout)?;
    let workers = run.parallel.unwrap_or(config.batch.max_workers);
    let report = batch::run_site_checks(&resolver, records, workers).await;

    finish_run(report, run)
}

async fn run_enrich(config: &AppConfig, input: &Path, run: &RunOptions) -> Result<()> {
    let records = input::load_business_file(input)?;
    info!(count = records.len(), "loaded business list");

    let enricher = build_enricher(config, run.timeout)?;
    let workers = run.parallel.unwrap_or(config.batch.max_workers);
    let report = batch::run_enrichment(&enricher, records, workers).await;

    finish_run(report, run)
}

async fn run_resolve(config: &AppConfig, name: &str) -> Result<()> {
    let resolver = build_resolver(config, None)?;

    match resolver.resolve(name).await {
        SiteResolution::Found { url, attempts } => {
            info!(attempts, "website found");
            println!("✅ {url}");
            Ok(())
        }
        SiteResolution::NotFound { attempts } => {
            println!("❌ No website found ({attempts} candidates probed)");
            std::process::exit(1);
        }
        SiteResolution::NoCandidates => {
            println!("❌ The name normalizes to nothing usable, no candidates to probe");
            std::process::exit(1);
        }
    }
}

fn build_resolver(config: &AppConfig, timeout_override: Option<u64>) -> Result<SiteResolver> {
    let timeout = timeout_override
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.http.probe_timeout());

    let probe = ExistenceProbe::new(timeout, &config.http.user_agent)
        .context("failed to build the HTTP probe")?;
    Ok(SiteResolver::new(probe))
}

fn build_enricher(config: &AppConfig, timeout_override: Option<u64>) -> Result<Enricher> {
    let resolver = build_resolver(config, timeout_override)?;

    let places = match config.places.resolve_api_key() {
        Some(key) => Some(
            PlacesClient::with_base_url(
                &key,
                config.http.api_timeout(),
                &config.http.user_agent,
                &config.places.base_url,
            )
            .context("failed to build the places client")?,
        ),
        None => {
            warn!(
                "no places API key configured ({} unset), enrichment degrades to domain guessing",
                config::API_KEY_ENV
            );
            None
        }
    };

    Ok(Enricher::new(resolver, places))
}

/// Print the run summary, apply the prospects-only filter, write the file.
fn finish_run(report: batch::BatchReport, run: &RunOptions) -> Result<()> {
    export::print_batch_summary(&report.summary);

    let report = if run.only_missing {
        batch::BatchReport::from_records(
            report
                .records
                .into_iter()
                .filter(|r| !r.has_website)
                .collect(),
        )
    } else {
        report
    };

    let path = run
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(export::default_output_path(run.format.extension())));

    match run.format {
        OutputFormat::Csv => export::export_csv(&report.records, &path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        OutputFormat::Json => export::export_json(&report, &path)
            .with_context(|| format!("failed to write {}", path.display()))?,
    }

    println!("✅ Results written to {}", path.display());
    Ok(())
}
