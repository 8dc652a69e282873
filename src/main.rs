mod settings;

use crate::settings::Settings;
use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use yahoo_fantasy_api::records::CategoryRecordCalculator;

/// Live standings and weekly category records for a Yahoo fantasy basketball league.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the league as if the current week ended right now.
    Standings,
    /// Season-best single-week totals for threes, points, rebounds, assists, steals and blocks.
    Records,
}

#[derive(Serialize)]
struct Report<T> {
    league_key: String,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    result: T,
}

#[derive(Serialize)]
struct Records<T> {
    records: T,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.settings.log_level.as_deref())?;

    let api = cli.settings.api();
    let credentials = cli.settings.credentials();
    let league_key = api.league_key();

    let json = match cli.command {
        Command::Standings => {
            let calculator = cli.settings.standings_calculator();
            info!(
                "Calculating live standings for {league_key} (tie-break: {})",
                calculator.tie_break_name()
            );
            let standings = calculator
                .calculate(&api, &credentials)
                .await
                .context("live standings are unavailable")?;
            render(league_key, standings)?
        }
        Command::Records => {
            info!("Calculating category records for {league_key}");
            let records = CategoryRecordCalculator
                .calculate(&api, &credentials)
                .await
                .context("category records are unavailable")?;
            render(league_key, Records { records })?
        }
    };

    println!("{json}");
    Ok(())
}

fn render<T: Serialize>(league_key: String, result: T) -> anyhow::Result<String> {
    let report = Report { league_key, generated_at: Utc::now(), result };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Logs go to stderr so stdout stays machine-readable. `log` records from the
/// api crate are bridged into the subscriber.
fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}
