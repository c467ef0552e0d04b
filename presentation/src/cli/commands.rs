//! CLI command definitions

use clap::{Parser, ValueEnum};
use sage_domain::ProviderSelection;
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every sub-task with its attempts, then the final answer
    Full,
    /// Only the aggregated final answer
    Final,
    /// JSON output
    Json,
}

/// Provider families a run may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Local,
    Cloud,
    All,
}

impl From<ProviderArg> for ProviderSelection {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Local => ProviderSelection::Local,
            ProviderArg::Cloud => ProviderSelection::Cloud,
            ProviderArg::All => ProviderSelection::All,
        }
    }
}

/// CLI arguments for sage
#[derive(Parser, Debug)]
#[command(name = "sage")]
#[command(author, version, about = "Sequential task orchestration across local and cloud LLMs")]
#[command(long_about = r#"
Sage answers a request by splitting it into ordered sub-tasks.

Each sub-task goes through three steps:
1. Assignment: a backend model and call parameters are chosen
2. Execution: the model answers, seeing the outputs of earlier sub-tasks
3. Evaluation: an evaluator scores the answer; weak answers are retried
   on a different model with escalated parameters

The accepted (or best) answers are then aggregated into one response.

Configuration files are loaded from (in priority order):
1. SAGE_* environment variables (e.g. SAGE_ORCHESTRATION__MAX_RETRIES=5)
2. --config <path>     Explicit config file
3. ./sage.toml         Project-level config
4. ~/.config/sage/config.toml   Global config

Example:
  sage "Summarize the causes of the 2008 financial crisis"
  sage --providers local -m gemma3:4b -m qwen3:1.7b "Write a Rust fizzbuzz"
  sage -o json --threshold 0.8 "Compare TCP and QUIC"
"#)]
pub struct Cli {
    /// The request to answer
    pub request: Option<String>,

    /// Provider families to use
    #[arg(long, value_enum, value_name = "SELECTION")]
    pub providers: Option<ProviderArg>,

    /// Restrict available models (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Retries per sub-task after the first attempt
    #[arg(long, value_name = "N")]
    pub max_retries: Option<usize>,

    /// Acceptance threshold for evaluator confidence, in [0, 1]
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Extra context passed to decomposition
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

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

    /// Directory for daily rolling diagnostic logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
