//! Pipeline Tracker computes sales dashboard metrics from a snapshot of
//! opportunity records.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pipeline_core::config::AppConfig;
use pipeline_core::types::LeadSource;
use pipeline_core::OpportunityStore;
use pipeline_reporting::{rank_by_revenue, DashboardFilter, DashboardService};
use pipeline_store::record::{import_file, OpportunityRecord};
use pipeline_store::{samples, InMemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pipeline-tracker")]
#[command(about = "Sales pipeline analytics over opportunity records")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "PIPELINE_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON logs (overrides config)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the dashboard and print it as JSON
    Dashboard {
        /// JSON array of opportunity records (sample data if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Restrict to opportunities created in this year (requires --month)
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Restrict to opportunities created in this month, 1-12
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Only include this lead source, e.g. "Cold Calling"
        #[arg(long)]
        lead_source: Option<LeadSource>,

        /// Only include this salesperson
        #[arg(long)]
        salesperson: Option<String>,

        /// Order the salesperson leaderboard by revenue instead of name
        #[arg(long, default_value_t = false)]
        rank_by_revenue: bool,

        /// Skip the previous-month comparison (overrides config)
        #[arg(long, default_value_t = false)]
        no_compare: bool,

        /// Pretty-print the output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Print every scheduled call as a dated calendar event
    Calendar {
        /// JSON array of opportunity records (sample data if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Only calls dated in this year (requires --month)
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Only calls dated in this month, 1-12
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Only include this salesperson
        #[arg(long)]
        salesperson: Option<String>,

        /// Pretty-print the output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Load records, normalize them and print the stored flat records
    Normalize {
        /// JSON array of opportunity records
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(config: &AppConfig, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log.level.clone().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json || config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_store(input: Option<&Path>) -> anyhow::Result<InMemoryStore> {
    let store = InMemoryStore::new();
    match input {
        Some(path) => {
            import_file(&store, path)
                .with_context(|| format!("loading records from {}", path.display()))?;
        }
        None => {
            warn!("No input file given, using sample data");
            samples::seed(&store)?;
        }
    }
    Ok(store)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match AppConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e).context("loading configuration"),
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    init_tracing(&config, cli.json_logs);
    info!(node_id = %config.node_id, "Pipeline Tracker starting up");

    match cli.command {
        Commands::Dashboard {
            input,
            year,
            month,
            lead_source,
            salesperson,
            rank_by_revenue: by_revenue,
            no_compare,
            pretty,
        } => {
            if no_compare {
                config.dashboard.compare_previous_month = false;
            }
            info!(
                parallel = config.dashboard.parallel,
                compare = config.dashboard.compare_previous_month,
                "Configuration loaded"
            );

            let store = Arc::new(load_store(input.as_deref())?);
            let service = DashboardService::new(store, config.dashboard.clone());
            let filter = DashboardFilter {
                lead_source,
                salesperson,
            };

            let mut data = match (year, month) {
                (Some(year), Some(month)) => service.for_month(year, month, &filter).await?,
                _ => service.for_all(&filter).await?,
            };
            if by_revenue {
                rank_by_revenue(&mut data.salespeople);
            }
            print_json(&data, pretty)?;
        }
        Commands::Calendar {
            input,
            year,
            month,
            salesperson,
            pretty,
        } => {
            let store = Arc::new(load_store(input.as_deref())?);
            let service = DashboardService::new(store, config.dashboard.clone());
            let filter = DashboardFilter {
                lead_source: None,
                salesperson,
            };
            let events = service.calendar(year.zip(month), &filter)?;
            print_json(&events, pretty)?;
        }
        Commands::Normalize { input } => {
            let store = load_store(Some(input.as_path()))?;
            let records: Vec<OpportunityRecord> =
                store.all().iter().map(OpportunityRecord::from).collect();
            print_json(&records, true)?;
        }
    }

    Ok(())
}
