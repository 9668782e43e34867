//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for debate results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Round-by-round report followed by the recommendation
    Text,
    /// Only the final recommendation
    Recommendation,
    /// JSON output
    Json,
}

/// CLI arguments for research-debate
#[derive(Parser, Debug)]
#[command(name = "research-debate")]
#[command(author, version, about = "Bull/bear research debate over analyst reports")]
#[command(long_about = r#"
research-debate runs a structured bull/bear debate over a set of analyst
reports and prints a synthesized recommendation.

Each round both advocates argue in parallel, a judge scores the pair and the
debate either continues or ends on consensus, on the round limit, or when
neither side delivers before the argument deadline.

Advocates, judge and synthesizer are external commands configured under
[generators.<role>]. Each receives its request as JSON on stdin and prints
its text on stdout.

Configuration files are loaded from (in priority order):
1. DEBATE_* environment variables (e.g. DEBATE_DEBATE__MAX_ROUNDS=5)
2. --config <path>     Explicit config file
3. ./debate.toml or ./.debate.toml   Project-level config
4. ~/.config/research-debate/config.toml   Global config

Example:
  research-debate AAPL --reports reports/aapl.json
  research-debate MSFT --reports msft.json --max-rounds 5 --output json
"#)]
pub struct Cli {
    /// Ticker symbol under debate
    pub ticker: Option<String>,

    /// Analyst reports file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub reports: Option<PathBuf>,

    /// Maximum number of debate rounds
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Seconds to wait for both arguments each round
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Minimum judge score (0-10) required for consensus
    #[arg(long, value_name = "SCORE")]
    pub min_quality: Option<f64>,

    /// What to do with arguments that arrive after their round closed
    /// ("discard" or "carry_forward")
    #[arg(long, value_name = "POLICY")]
    pub late_arguments: Option<String>,

    /// Append a JSONL transcript of the debate to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
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
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "research-debate",
            "AAPL",
            "--reports",
            "aapl.json",
            "--max-rounds",
            "5",
            "--timeout",
            "10",
            "--late-arguments",
            "carry_forward",
            "-o",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.ticker.as_deref(), Some("AAPL"));
        assert_eq!(cli.reports, Some(PathBuf::from("aapl.json")));
        assert_eq!(cli.max_rounds, Some(5));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.late_arguments.as_deref(), Some("carry_forward"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["research-debate", "--show-config"]).unwrap();
        assert!(cli.ticker.is_none());
        assert!(cli.show_config);
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["research-debate", "AAPL", "-o", "yaml"]).is_err());
    }
}
