use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::registry::CategoryFilter;

/// Upper bound on concurrent lookups, CLI and config alike.
pub const MAX_WORKERS: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "siteprospector")]
#[command(about = "Finds which French businesses have no website: registry search, domain guessing and places enrichment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (default: ./config/siteprospector.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG with per-candidate details)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the company registry and check each hit for a website
    Search {
        /// Business sector or free-text keywords, e.g. "boulangerie"
        sector: String,

        /// Restrict results to a city
        #[arg(short, long)]
        city: Option<String>,

        /// Restrict results to a postal code
        #[arg(short = 'p', long, value_name = "CODE")]
        postal_code: Option<String>,

        /// Business category filter
        #[arg(long, value_enum)]
        category: Option<CategoryFilter>,

        /// Maximum number of businesses to fetch (the registry caps a page at 25)
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Enrich every hit through the places API instead of domain guessing only
        #[arg(long)]
        enrich: bool,

        /// Print the registry hits without probing for websites
        #[arg(long, conflicts_with = "enrich")]
        list_only: bool,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Check a business list file for websites via domain guessing
    Check {
        /// CSV or JSON file with the businesses to process
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Enrich a business list file through the places API, with domain
    /// guessing as the fallback
    Enrich {
        /// CSV or JSON file with the businesses to process
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Resolve a single business name to a website, if one exists
    Resolve {
        /// Business name, e.g. "Boulangerie Dupont SARL"
        name: String,
    },

    /// Create the default configuration file at ./config/siteprospector.toml
    InitConfig,
}

/// Options shared by every command that processes a batch.
#[derive(Args, Debug, Clone)]
pub struct RunOptions {
    /// Write results to this file (default: prospection_<timestamp>.<ext>)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Export only businesses without a website
    #[arg(long)]
    pub only_missing: bool,

    /// Concurrent lookups (overrides the configured value)
    #[arg(short = 'j', long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Probe timeout in seconds (overrides the configured value)
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Commands::Search { sector, limit, run, .. } => {
                if sector.trim().is_empty() {
                    return Err("Sector cannot be empty".to_string());
                }
                if *limit == 0 {
                    return Err("Limit must be greater than 0".to_string());
                }
                run.validate()
            }
            Commands::Check { run, .. } | Commands::Enrich { run, .. } => run.validate(),
            Commands::Resolve { name } => {
                if name.trim().is_empty() {
                    return Err("Business name cannot be empty".to_string());
                }
                Ok(())
            }
            Commands::InitConfig => Ok(()),
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(parallel) = self.parallel {
            if parallel == 0 {
                return Err("Parallel lookups must be greater than 0".to_string());
            }
            if parallel > MAX_WORKERS {
                return Err(format!(
                    "Parallel lookups cannot exceed {} to avoid hammering servers",
                    MAX_WORKERS
                ));
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
