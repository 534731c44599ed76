mod poll;
mod roster;
mod trends;

use clap::{Parser, Subcommand};

use crate::poll::PollCommands;
use crate::roster::RosterCommands;
use crate::trends::TrendCommands;

#[derive(Debug, Parser)]
#[command(name = "trendwatch-cli")]
#[command(about = "Trendwatch command line interface")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run a poll cycle immediately
    Poll {
        #[command(subcommand)]
        command: PollCommands,
    },
    /// Inspect tracked trends
    Trends {
        #[command(subcommand)]
        command: TrendCommands,
    },
    /// Inspect and validate the keyword roster
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Poll { command }) => poll::dispatch(command).await,
        Some(Commands::Trends { command }) => trends::dispatch(command).await,
        Some(Commands::Roster { command }) => roster::dispatch(command).await,
        None => {
            println!("trendwatch-cli: use a subcommand (poll, trends, roster); see --help");
            Ok(())
        }
    }
}

/// Mark a run failed, logging (not surfacing) bookkeeping errors so the
/// original failure stays the one the caller sees.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    run_type: &str,
    message: String,
) {
    if let Err(e) = trendwatch_db::fail_poll_run(pool, run_id, &message).await {
        tracing::error!(run_id, run_type, error = %e, "failed to mark poll run as failed");
    }
}

/// Load config and roster, connect the pool, and run migrations.
pub(crate) async fn bootstrap() -> anyhow::Result<(
    trendwatch_core::AppConfig,
    trendwatch_core::Roster,
    sqlx::PgPool,
)> {
    let config = trendwatch_core::load_app_config()?;
    let roster = trendwatch_core::load_roster(&config.roster_path)?;
    let pool = trendwatch_db::connect_pool(
        &config.database_url,
        trendwatch_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    trendwatch_db::run_migrations(&pool).await?;
    Ok((config, roster, pool))
}
