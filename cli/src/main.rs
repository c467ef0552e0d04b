//! CLI entrypoint for sage
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use sage_application::{
    AggregationStrategy, AssignmentStrategy, ConfiguredAssignment, DecompositionStrategy,
    LlmAssignment, LlmDecomposition, LlmJudgment, ModelCall, ModeratorAggregation, NoProgress,
    OrchestrationProgress, ProcessRequestError, ProcessRequestInput, ProcessRequestUseCase,
    ProviderSet, SectionedAggregation, SimilarityJudgment, SingleTaskDecomposition,
    TemplateDecomposition,
};
use sage_domain::{ModelName, OrchestrationConfig, ProviderSelection, Request};
use sage_infrastructure::{
    AggregationChoice, AssignmentChoice, ConfigLoader, DecompositionChoice, FileConfig,
    FileOutputFormat, JsonlRunLogger, build_provider_set,
};
use sage_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Exit code for a run interrupted by Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting sage");

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration from files
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    apply_overrides(&cli, &mut config);
    let orchestration = config
        .to_orchestration_config()
        .context("Invalid configuration")?;
    let selection = config.selection()?;

    let request = match cli.request.as_deref().and_then(|r| Request::try_new(r)) {
        Some(request) => request,
        None => bail!("A request is required. Run `sage --help` for usage."),
    };

    let format = cli
        .output
        .unwrap_or_else(|| output_format(config.output.format.unwrap_or_default()));
    ConsoleFormatter::set_color(config.output.color && std::io::stdout().is_terminal());

    // === Dependency Injection ===
    let providers = Arc::new(build_provider_set(&config));
    let cancellation = CancellationToken::new();
    let use_case = build_use_case(&config, orchestration, providers)
        .with_cancellation(cancellation.clone());
    let use_case = match config.logging.run_log_path() {
        Some(path) => match JsonlRunLogger::new(&path) {
            Some(logger) => use_case.with_run_logger(Arc::new(logger)),
            None => {
                warn!("Could not open run log {}; continuing without it", path.display());
                use_case
            }
        },
        None => use_case,
    };

    {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCancelling...");
                cancellation.cancel();
            }
        });
    }

    let mut input = ProcessRequestInput::new(request).with_selection(selection);
    if let Some(context) = &cli.context {
        input = input.with_context(context.clone());
    }

    // Execute with the progress display that fits the terminal
    let progress: Box<dyn OrchestrationProgress> = if cli.quiet || format == OutputFormat::Json {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    match use_case.process_with_progress(input, progress.as_ref()).await {
        Ok(result) => {
            let output = match format {
                OutputFormat::Full => ConsoleFormatter::format(&result),
                OutputFormat::Final => ConsoleFormatter::format_final_only(&result),
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(ProcessRequestError::Cancelled { partial }) => {
            let output = match format {
                OutputFormat::Json => ConsoleFormatter::format_partial_json(&partial),
                _ => ConsoleFormatter::format_partial(&partial),
            };
            println!("{}", output);
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Err(e) => Err(e).context("Run failed"),
    }
}

/// Install the console subscriber and, with `--log-dir`, a daily rolling file.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace", // -vvv or more
        })
    });

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "sage.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

/// Command-line flags override whatever the files said.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(providers) = cli.providers {
        config.orchestration.provider_selection =
            ProviderSelection::from(providers).as_str().to_string();
    }
    if let Some(retries) = cli.max_retries {
        config.orchestration.max_retries = retries;
    }
    if let Some(threshold) = cli.threshold {
        config.orchestration.similarity_threshold = threshold;
    }

    if !cli.model.is_empty() {
        config.models.restrict_to(&cli.model);
        let kept: HashSet<String> = config
            .models
            .available
            .iter()
            .map(|m| m.name.trim().to_string())
            .collect();
        config
            .models
            .task_preferences
            .retain(|_, model| kept.contains(model.trim()));
        if !config.models.contains(&config.orchestration.default_model)
            && let Some(first) = config.models.available.first()
        {
            config.orchestration.default_model = first.name.clone();
        }
    }
}

fn output_format(format: FileOutputFormat) -> OutputFormat {
    match format {
        FileOutputFormat::Full => OutputFormat::Full,
        FileOutputFormat::Final => OutputFormat::Final,
        FileOutputFormat::Json => OutputFormat::Json,
    }
}

/// Wire the configured strategies into the engine.
fn build_use_case(
    file: &FileConfig,
    config: OrchestrationConfig,
    providers: Arc<ProviderSet>,
) -> ProcessRequestUseCase {
    let params = file.execution_params();
    let config = Arc::new(config);
    let model_call = |model: &ModelName| {
        ModelCall::from_config(providers.clone(), &config, model)
            .with_timeout(params.call_timeout)
    };

    let decomposition: Arc<dyn DecompositionStrategy> = match file.orchestration.decomposition {
        DecompositionChoice::Llm => {
            let planner = file.role_model(file.orchestration.planner_model.as_ref());
            Arc::new(
                LlmDecomposition::new(model_call(&planner))
                    .with_fallback(Arc::new(TemplateDecomposition)),
            )
        }
        DecompositionChoice::Single => Arc::new(SingleTaskDecomposition),
        DecompositionChoice::Template => Arc::new(TemplateDecomposition),
    };

    let assignment: Arc<dyn AssignmentStrategy> = match file.orchestration.assignment {
        AssignmentChoice::Configured => Arc::new(ConfiguredAssignment::new(config.clone())),
        AssignmentChoice::Llm => {
            let router = file.role_model(file.orchestration.router_model.as_ref());
            Arc::new(LlmAssignment::new(model_call(&router)))
        }
    };

    let evaluator = ModelCall::from_config(providers.clone(), &config, config.evaluator())
        .with_timeout(params.judge_timeout);
    let judgment = Arc::new(LlmJudgment::new(
        evaluator,
        SimilarityJudgment::new(config.acceptance_threshold),
    ));

    let aggregation: Arc<dyn AggregationStrategy> = match file.orchestration.aggregation {
        AggregationChoice::Sectioned => Arc::new(SectionedAggregation::new()),
        AggregationChoice::Moderator => {
            let moderator = file.role_model(file.orchestration.moderator_model.as_ref());
            Arc::new(ModeratorAggregation::new(model_call(&moderator)))
        }
    };

    ProcessRequestUseCase::new(
        providers,
        decomposition,
        assignment,
        judgment,
        aggregation,
        config,
    )
    .with_execution_params(params)
}
