//! Saborê CLI - Sales analytics over restaurant order snapshots.
//!
//! # Usage
//!
//! ```bash
//! # Full report from the backend (SABORE_API_BASE_URL)
//! sabore report
//!
//! # Full report from a saved payload
//! sabore --file pedidos.json report
//!
//! # Growth over a 7-day window, as of a fixed instant
//! sabore --now 2024-06-30T00:00:00Z metrics --window-days 7
//!
//! # Top 5 items for one restaurant in January
//! sabore --restaurant 12 --from 2024-01-01 --to 2024-01-31 top-items -n 5
//!
//! # Weekly revenue series
//! sabore --file pedidos.json series --granularity semana
//! ```
//!
//! # Commands
//!
//! - `report` - Every analysis in one document
//! - `metrics` - Revenue, order count, average ticket, window growth
//! - `top-items` - Best-selling items by quantity
//! - `series` - Revenue per day, week or month

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sabore_analytics::Granularity;
use sabore_cli::commands::{self, Analysis, OrderSource};
use sabore_cli::{CliConfig, CliError, LogFormat, OrderQuery};
use sabore_core::RestaurantId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sabore")]
#[command(author, version, about = "Saborê sales analytics")]
struct Cli {
    /// Read orders from a JSON file instead of the backend
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Only orders of this restaurant (backend only)
    #[arg(long, global = true)]
    restaurant: Option<String>,

    /// First day of orders to fetch, YYYY-MM-DD (backend only)
    #[arg(long, global = true)]
    from: Option<NaiveDate>,

    /// Last day of orders to fetch, YYYY-MM-DD (backend only)
    #[arg(long, global = true)]
    to: Option<NaiveDate>,

    /// Reference instant for time windows, RFC 3339 (default: now)
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every analysis in one document
    Report,
    /// Print revenue, order count, average ticket and growth
    Metrics {
        /// Growth window in days (default: SABORE_WINDOW_DAYS or 30)
        #[arg(short, long)]
        window_days: Option<i64>,
    },
    /// Print the best-selling items
    TopItems {
        /// Number of items (default: SABORE_TOP_N or 10)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print revenue per period
    Series {
        /// day/dia, week/semana or month/mes
        #[arg(short, long, default_value = "day")]
        granularity: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };
    init_tracing(config.log_format);

    let analysis = select_analysis(&cli.command, &config);
    if let Err(e) = analysis.validate(&config.analytics) {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(2);
    }

    if let Err(e) = run(cli, analysis, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Install the global subscriber. Logs always go to stderr.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let json = format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// The analysis for `command`, with flags taking precedence over the
/// environment.
fn select_analysis(command: &Commands, config: &CliConfig) -> Analysis {
    match command {
        Commands::Report => Analysis::Report,
        Commands::Metrics { window_days } => Analysis::Metrics {
            window_days: window_days.unwrap_or(config.analytics.window_days),
        },
        Commands::TopItems { limit } => Analysis::TopItems {
            limit: limit.unwrap_or(config.analytics.top_n),
        },
        Commands::Series { granularity } => Analysis::Series {
            granularity: Granularity::from_name(granularity),
        },
    }
}

async fn run(cli: Cli, analysis: Analysis, config: &CliConfig) -> Result<(), CliError> {
    let source = match cli.file {
        Some(path) => OrderSource::File(path),
        None => OrderSource::Backend(OrderQuery {
            restaurant_id: cli.restaurant.map(RestaurantId::from),
            from: cli.from,
            to: cli.to,
        }),
    };

    let snapshot = commands::load_snapshot(&source, config).await?;
    let now = cli.now.unwrap_or_else(Utc::now);

    tracing::info!(
        analysis = analysis.name(),
        %source,
        orders = snapshot.len(),
        "Running analysis"
    );

    let output = analysis.run(&snapshot, now, &config.analytics)?;
    commands::emit(&output)
}
