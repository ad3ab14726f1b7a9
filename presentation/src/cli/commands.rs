//! CLI command definitions

use autopilot_domain::ConsensusMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for consensus results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary for the terminal
    Console,
    /// The markdown report, as published to the issue tracker
    Markdown,
    /// JSON output
    Json,
}

/// Which consensus question to ask
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Judge a proposed approach (APPROVE / SUGGEST_CHANGES / REJECT)
    Plan,
    /// Judge completed work (APPROVE / REJECT / ABSTAIN)
    Review,
}

impl From<ModeArg> for ConsensusMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Plan => ConsensusMode::Plan,
            ModeArg::Review => ConsensusMode::Review,
        }
    }
}

/// CLI arguments for quorum-autopilot
#[derive(Parser, Debug)]
#[command(name = "quorum-autopilot")]
#[command(author, version, about = "Autonomous task runner gated by multi-model consensus")]
#[command(long_about = r#"
Quorum Autopilot admits tasks from issue-tracker webhooks, runs an agent
session per task, and gates each attempt with a plan consensus before the
work and a review consensus after it.

Configuration is merged from (in priority order):
1. AUTOPILOT_* environment variables (e.g. AUTOPILOT_SCHEDULER__MAX_CONCURRENT=4)
2. --config <path>     Explicit config file
3. ./autopilot.toml    Project-level config
4. ~/.config/quorum-autopilot/config.toml   Global config

Example:
  quorum-autopilot serve --listen 0.0.0.0:8787
  quorum-autopilot consensus --mode review -m claude -m codex "Is this migration safe?"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the webhook/task HTTP server and the scheduler
    Serve {
        /// Listen address (overrides server.listen)
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,

        /// Write each published consensus report as markdown into this directory
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,
    },

    /// Run a single consensus round from the terminal
    Consensus {
        /// The question to put to the models ("-" reads stdin)
        question: String,

        /// Question type
        #[arg(long, value_enum, default_value = "plan")]
        mode: ModeArg,

        /// Models to ask (can be specified multiple times; defaults to consensus.models)
        #[arg(short, long, value_name = "MODEL")]
        model: Vec<String>,

        /// Approval threshold: majority, supermajority, unanimous or N%
        #[arg(long, value_name = "THRESHOLD")]
        threshold: Option<String>,

        /// Per-model timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "console")]
        output: OutputFormat,

        /// Suppress progress indicators
        #[arg(short, long)]
        quiet: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let cli =
            Cli::try_parse_from(["quorum-autopilot", "-vv", "serve", "--listen", "0.0.0.0:9000"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Some(Command::Serve { listen: Some(ref l), .. }) if l == "0.0.0.0:9000"
        ));
    }

    #[test]
    fn test_parse_consensus() {
        let cli = Cli::try_parse_from([
            "quorum-autopilot",
            "consensus",
            "--mode",
            "review",
            "-m",
            "claude",
            "-m",
            "codex",
            "--threshold",
            "unanimous",
            "Ship it?",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Some(Command::Consensus {
                question,
                mode,
                model,
                threshold,
                output,
                ..
            }) => {
                assert_eq!(question, "Ship it?");
                assert_eq!(ConsensusMode::from(mode), ConsensusMode::Review);
                assert_eq!(model, vec!["claude", "codex"]);
                assert_eq!(threshold.as_deref(), Some("unanimous"));
                assert_eq!(output, OutputFormat::Console);
            }
            other => panic!("expected consensus command, got {:?}", other),
        }
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::try_parse_from(["quorum-autopilot", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
