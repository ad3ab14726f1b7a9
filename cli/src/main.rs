//! CLI entrypoint for Quorum Autopilot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use autopilot_application::{
    ConsensusProgress, ExecuteTaskUseCase, IngestWebhookUseCase, ModelInvoker, NoTaskEventLog,
    RunConsensusInput, RunConsensusUseCase, SchedulerLoop, TaskEventLog,
};
use autopilot_domain::{ApprovalThreshold, Clock, ConfigIssue, Model, SystemClock, WebhookVerifier};
use autopilot_infrastructure::{
    AgentCommand, CachedConfigSource, CliModelInvoker, CommandAgentRunner, ConfigLoader,
    FileConfig, JsonlTaskEventLog, LoggingIssueTracker,
};
use autopilot_presentation::{
    AppState, Cli, Command, ConsoleFormatter, ModeArg, OutputFormat, ProgressReporter,
    SimpleProgress,
};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Arguments of the `consensus` subcommand
struct ConsensusArgs {
    question: String,
    mode: ModeArg,
    models: Vec<String>,
    threshold: Option<String>,
    timeout: Option<u64>,
    output: OutputFormat,
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    let config = ConfigLoader::load(cli.config.as_deref())?;
    report_issues(&config.validate());

    if cli.show_config {
        println!("{}", ConfigLoader::describe_sources(cli.config.as_deref()));
        println!("{:#?}", config);
        return Ok(());
    }

    match cli.command {
        Some(Command::Serve { listen, report_dir }) => {
            serve(config, cli.config, listen, report_dir).await
        }
        Some(Command::Consensus {
            question,
            mode,
            model,
            threshold,
            timeout,
            output,
            quiet,
        }) => {
            let args = ConsensusArgs {
                question,
                mode,
                models: model,
                threshold,
                timeout,
                output,
                quiet,
            };
            consensus(config, args).await
        }
        None => bail!(
            "No command given. Try `quorum-autopilot serve` or `quorum-autopilot --help`."
        ),
    }
}

/// Console logging by verbosity, plus a daily rolling file when `log_dir` is set.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "quorum-autopilot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        if issue.is_error() {
            error!("Config: {}", issue);
        } else {
            warn!("Config: {}", issue);
        }
    }
}

async fn serve(
    config: FileConfig,
    config_path: Option<PathBuf>,
    listen: Option<String>,
    report_dir: Option<PathBuf>,
) -> Result<()> {
    if config.validate().iter().any(ConfigIssue::is_error) {
        bail!("Refusing to start with configuration errors (see log above)");
    }

    let addr = match listen {
        Some(listen) => listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", listen))?,
        None => config.server.parse_listen().0,
    };

    // === Dependency Injection ===
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cancel = CancellationToken::new();

    let verifier = WebhookVerifier::new(config.webhook.to_verifier_settings(), clock.clone());
    if !verifier.has_secret() {
        warn!(
            "No webhook secret configured; deliveries are only accepted if allow_unsigned is set"
        );
    }

    let invoker = Arc::new(CliModelInvoker::with_overrides(
        config.consensus.commands.clone(),
    ));
    let (settings, _) = config.consensus.to_settings();
    for model in &settings.models {
        if !invoker.is_available(model) {
            warn!("No CLI found for model {}; its votes will be errors", model);
        }
    }

    let agent = Arc::new(CommandAgentRunner::new(AgentCommand {
        program: config.agent.command.clone(),
        args: config.agent.args.clone(),
        timeout: config.agent.timeout(),
        working_dir: config.agent.working_dir.clone(),
    }));

    let mut tracker = LoggingIssueTracker::new();
    if let Some(dir) = report_dir.or_else(|| config.logging.report_dir.clone()) {
        info!("Writing consensus reports to {}", dir.display());
        tracker = tracker.with_report_dir(dir);
    }
    let tracker = Arc::new(tracker);

    let consensus_source = Arc::new(CachedConfigSource::from_sources(
        settings,
        config.config_ttl_ms,
        clock.clone(),
        config_path,
    ));

    let event_log: Arc<dyn TaskEventLog> = match config
        .logging
        .event_log
        .as_ref()
        .and_then(JsonlTaskEventLog::new)
    {
        Some(log) => {
            info!("Recording task events to {}", log.path().display());
            Arc::new(log)
        }
        None => Arc::new(NoTaskEventLog),
    };

    let executor = ExecuteTaskUseCase::new(
        invoker,
        agent,
        tracker.clone(),
        consensus_source,
        event_log.clone(),
    );

    let (scheduler, handle) = SchedulerLoop::new(
        config.scheduler.to_scheduler_config(),
        Arc::new(executor),
        clock,
        cancel.clone(),
    );
    let scheduler = scheduler
        .with_tracker(tracker)
        .with_event_log(event_log)
        .spawn();

    let ingest = Arc::new(IngestWebhookUseCase::new(Arc::new(verifier), handle.clone()));
    let state = AppState::new(ingest, handle.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
        }
        shutdown.cancel();
    });

    autopilot_presentation::serve(listener, state, cancel.clone()).await?;

    // The server has stopped taking requests; let running attempts finish.
    if handle.shutdown().await.is_err() {
        warn!("Scheduler already stopped");
    }
    if let Err(e) = scheduler.await {
        error!("Scheduler task ended abnormally: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}

async fn consensus(config: FileConfig, args: ConsensusArgs) -> Result<()> {
    let question = if args.question == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read question from stdin")?;
        buf
    } else {
        args.question
    };
    if question.trim().is_empty() {
        bail!("Question is empty");
    }

    let (mut settings, _) = config.consensus.to_settings();
    if !args.models.is_empty() {
        settings.models = Model::parse_list(&args.models.join(","));
    }
    if let Some(threshold) = &args.threshold {
        settings.threshold = threshold
            .parse::<ApprovalThreshold>()
            .with_context(|| format!("Invalid threshold: {}", threshold))?;
    }
    if let Some(secs) = args.timeout {
        settings.timeout = Duration::from_secs(secs.max(1));
    }

    let invoker = Arc::new(CliModelInvoker::with_overrides(
        config.consensus.commands.clone(),
    ));
    let use_case = RunConsensusUseCase::new(invoker);
    let input = RunConsensusInput::new(args.mode.into(), question, &settings);

    let report = if args.quiet {
        use_case.execute(input).await?
    } else {
        let progress: Box<dyn ConsensusProgress> = if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        use_case.execute_with_progress(input, progress.as_ref()).await?
    };

    let output = match args.output {
        OutputFormat::Console => ConsoleFormatter::format(&report),
        OutputFormat::Markdown => ConsoleFormatter::format_markdown(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(())
}
