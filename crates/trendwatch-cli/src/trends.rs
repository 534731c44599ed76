//! Trend inspection command handlers for the CLI.

use clap::Subcommand;

use trendwatch_core::normalize_keyword;

use crate::bootstrap;

/// Sub-commands available under `trends`.
#[derive(Debug, Subcommand)]
pub enum TrendCommands {
    /// List tracked trends ranked by score
    List {
        /// Include archived trends
        #[arg(long)]
        include_archived: bool,

        /// Maximum number of trends to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one trend in full
    Show {
        /// Keyword in any spelling; resolved to its canonical form
        keyword: String,
    },
}

pub(crate) async fn dispatch(command: TrendCommands) -> anyhow::Result<()> {
    let (_config, _roster, pool) = bootstrap().await?;
    match command {
        TrendCommands::List {
            include_archived,
            limit,
        } => {
            let trends = trendwatch_db::list_trends(&pool, include_archived).await?;
            if trends.is_empty() {
                println!("no trends tracked yet; run `trendwatch-cli poll trends` first");
                return Ok(());
            }

            println!(
                "{:<4} {:<30} {:>10} {:>8} {:>8} {:>7} {:<9}",
                "#", "keyword", "score", "total", "daily", "srcs", "status"
            );
            for (i, trend) in trends.iter().take(limit).enumerate() {
                println!(
                    "{:<4} {:<30} {:>10.2} {:>8} {:>8} {:>7} {:<9}",
                    i + 1,
                    trend.canonical_keyword,
                    trend.score,
                    trend.total_mentions,
                    trend.daily_mentions,
                    trend.unique_source_count(),
                    trend.status
                );
            }
            Ok(())
        }
        TrendCommands::Show { keyword } => {
            let canonical = normalize_keyword(&keyword);
            let trend = trendwatch_db::get_trend_by_keyword(&pool, &canonical).await?;
            println!("{}", serde_json::to_string_pretty(&trend)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Cli, Commands};

    use super::TrendCommands;

    #[test]
    fn parses_trends_list_defaults() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "trends", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Trends {
                command: TrendCommands::List {
                    include_archived: false,
                    limit: 20,
                }
            })
        ));
    }

    #[test]
    fn parses_trends_show_keyword() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "trends", "show", "NewJeans"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Trends {
                command: TrendCommands::Show { ref keyword }
            }) if keyword == "NewJeans"
        ));
    }
}
