//! CLI entrypoint for research-debate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use debate_application::{
    ArgumentGenerator, CircuitBreakerRegistry, DebateParticipants, NoProgress,
    ReliabilityObserver, ReliableInvoker, RunDebateUseCase, TranscriptLogger,
};
use debate_infrastructure::{
    CommandGenerator, ConfigLoader, FileConfig, FileGeneratorConfig, JsonlTranscriptLogger,
    load_research,
};
use debate_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        println!("Configuration sources (lowest to highest priority):");
        for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("  {}", source);
        }
        return Ok(());
    }

    // Load configuration before logging so `[logging] log_file` applies
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    apply_overrides(&mut config, &cli);

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;

    info!("Starting research-debate");

    let engine = config
        .to_engine_config()
        .context("invalid debate configuration")?;

    let ticker = match cli.ticker.as_deref() {
        Some(t) if !t.trim().is_empty() => t.trim().to_uppercase(),
        _ => bail!("A ticker is required, e.g. `research-debate AAPL --reports aapl.json`"),
    };
    let Some(reports) = cli.reports.as_deref() else {
        bail!("--reports <PATH> is required");
    };
    let research = load_research(reports, &ticker)?;
    if research.reports.is_empty() {
        warn!("No analyst reports found in {}", reports.display());
    }

    // === Dependency Injection ===
    let participants = build_participants(&config)?;

    // One reporter shows both round progress and retry/breaker events
    let reporter = (!cli.quiet).then(|| Arc::new(ProgressReporter::new()));
    let observer: Arc<dyn ReliabilityObserver> = match &reporter {
        Some(reporter) => reporter.clone(),
        None => Arc::new(NoProgress),
    };
    let breakers = Arc::new(CircuitBreakerRegistry::new(engine.circuit));
    let invoker = ReliableInvoker::new(engine.retry, breakers).with_observer(Arc::clone(&observer));

    let mut use_case = RunDebateUseCase::with_invoker(engine, participants, Arc::new(invoker))?;

    let transcript_path = cli
        .transcript
        .clone()
        .or_else(|| config.logging.transcript.as_ref().map(PathBuf::from));
    if let Some(path) = transcript_path {
        let logger = JsonlTranscriptLogger::open(&path)
            .with_context(|| format!("cannot open transcript {}", path.display()))?;
        info!("Writing transcript to {}", logger.path().display());
        use_case = use_case.with_transcript(Arc::new(logger) as Arc<dyn TranscriptLogger>);
    }

    // Execute with or without progress reporting
    let result = match &reporter {
        Some(reporter) => {
            use_case
                .execute_with_progress(research, reporter.as_ref())
                .await?
        }
        None => use_case.execute(research).await?,
    };

    // Output results
    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format(&result),
        OutputFormat::Recommendation => ConsoleFormatter::format_recommendation_only(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    Ok(())
}

/// Command-line flags take priority over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(rounds) = cli.max_rounds {
        config.debate.max_rounds = rounds;
    }
    if let Some(timeout) = cli.timeout {
        config.debate.argument_timeout_seconds = timeout;
    }
    if let Some(score) = cli.min_quality {
        config.debate.min_quality_score = score;
    }
    if let Some(policy) = &cli.late_arguments {
        config.debate.late_arguments = policy.clone();
    }
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` wins over `-v` when set. With a log file configured, events
/// are also written there through a non-blocking writer; the returned guard
/// flushes it on drop.
fn init_logging(verbose: u8, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let path = Path::new(log_file);
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        bail!("[logging] log_file is not a file path: {}", log_file);
    };
    std::fs::create_dir_all(directory)
        .with_context(|| format!("cannot create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(Some(guard))
}

/// Build one command generator per role, failing on the first role that is
/// missing or whose program cannot be found.
fn build_participants(config: &FileConfig) -> Result<DebateParticipants> {
    let missing = config.generators.missing_roles();
    if !missing.is_empty() {
        bail!(
            "No generator command configured for: {}. Add a [generators.<role>] section with a `command`.",
            missing.join(", ")
        );
    }

    let build = |role: &str,
                 generator: Option<&FileGeneratorConfig>|
     -> Result<Arc<dyn ArgumentGenerator>> {
        let Some(generator) = generator else {
            bail!("No generator command configured for {}", role);
        };
        let command = CommandGenerator::from_config(generator);
        let located = command
            .locate()
            .with_context(|| format!("generators.{}.command", role))?;
        info!(
            "{} generator: {} (dependency {})",
            role,
            located.display(),
            command.dependency()
        );
        Ok(Arc::new(command))
    };

    let generators = &config.generators;
    Ok(DebateParticipants::new(
        build("bull", generators.bull.as_ref())?,
        build("bear", generators.bear.as_ref())?,
        build("judge", generators.judge.as_ref())?,
        build("synthesizer", generators.synthesizer.as_ref())?,
    ))
}
