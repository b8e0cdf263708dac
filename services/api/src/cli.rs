use crate::commands::{
    run_config_check, run_filter, run_score, ConfigCheckArgs, FilterArgs, ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_scout::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "lead-scout",
    about = "Enrich, score and rank discovered sales leads",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate, enrich, score and rank a file of raw candidate records
    Score(ScoreArgs),
    /// Query previously exported lead rows
    Leads {
        #[command(subcommand)]
        command: LeadsCommand,
    },
    /// Inspect the scoring configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum LeadsCommand {
    /// Filter exported rows by priority, score, text and work mode
    Filter(FilterArgs),
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigCommand {
    /// Load and validate the scoring configuration, then print a summary
    Check(ConfigCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Scoring configuration file (overrides LEAD_SCOUT_CONFIG)
    #[arg(long)]
    pub(crate) config: Option<std::path::PathBuf>,
    /// `name,score` CSV backing the judge policies
    #[arg(long)]
    pub(crate) judge_scores: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Leads {
            command: LeadsCommand::Filter(args),
        } => run_filter(args),
        Command::Config {
            command: ConfigCommand::Check(args),
        } => run_config_check(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_arguments_parse() {
        let cli = Cli::try_parse_from([
            "lead-scout",
            "score",
            "--input",
            "leads.csv",
            "--as-of",
            "2025-06-01",
            "--policy",
            "highest",
            "--judge-scores",
            "judge.csv",
            "--top",
            "25",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.input.to_str(), Some("leads.csv"));
                assert_eq!(args.top, Some(25));
                assert!(args.as_of.is_some());
                assert!(args.policy.is_some());
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn filter_accepts_repeated_priorities() {
        let cli = Cli::try_parse_from([
            "lead-scout",
            "leads",
            "filter",
            "--input",
            "ranked.csv",
            "--priority",
            "high",
            "--priority",
            "medium",
            "--min-score",
            "50",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Leads {
                command: LeadsCommand::Filter(args),
            }) => {
                assert_eq!(args.priority.len(), 2);
                assert_eq!(args.min_score, Some(50));
            }
            other => panic!("expected leads filter, got {other:?}"),
        }
    }

    #[test]
    fn bad_dates_are_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "lead-scout",
            "score",
            "--input",
            "leads.csv",
            "--as-of",
            "June 2025",
        ]);
        assert!(result.is_err());
    }
}
