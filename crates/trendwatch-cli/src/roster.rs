//! Roster inspection command handlers for the CLI.

use std::path::PathBuf;

use clap::Subcommand;

/// Sub-commands available under `roster`.
#[derive(Debug, Subcommand)]
pub enum RosterCommands {
    /// Load and validate the roster file, printing what it defines
    Check {
        /// Roster file to check; defaults to the configured TRENDWATCH_ROSTER_PATH
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub(crate) async fn dispatch(command: RosterCommands) -> anyhow::Result<()> {
    match command {
        RosterCommands::Check { path } => {
            // Validation happens inside load_roster; reaching the summary
            // below means the file passed.
            let path = match path {
                Some(p) => p,
                None => trendwatch_core::load_app_config()?.roster_path,
            };
            let roster = trendwatch_core::load_roster(&path)?;

            println!("roster ok: {}", path.display());
            println!("  vips: {}", roster.vips.len());
            for vip in &roster.vips {
                println!(
                    "    {} (tier {}, {} keywords)",
                    vip.id,
                    vip.tier,
                    vip.keywords.len()
                );
            }
            println!("  issues: {}", roster.issues.len());
            for issue in &roster.issues {
                println!(
                    "    {} (priority {}, {} related)",
                    issue.keyword,
                    issue.priority,
                    issue.related_keywords.len()
                );
            }
            println!("  custom keywords: {}", roster.custom_keywords.len());
            println!("  source overrides: {}", roster.sources.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Cli, Commands};

    use super::RosterCommands;

    #[test]
    fn parses_roster_check_defaults() {
        let cli = Cli::try_parse_from(["trendwatch-cli", "roster", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Roster {
                command: RosterCommands::Check { path: None }
            })
        ));
    }

    #[test]
    fn parses_roster_check_with_path() {
        let cli = Cli::try_parse_from([
            "trendwatch-cli",
            "roster",
            "check",
            "--path",
            "config/roster.yaml",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Roster {
                command: RosterCommands::Check { path: Some(ref p) }
            }) if p.ends_with("roster.yaml")
        ));
    }
}
