//! CLI entrypoint for mcpflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use mcpflow_application::{ConversationLogger, RunQueryUseCase, WorkflowEngine};
use mcpflow_infrastructure::{
    ConfigLoader, ConfigSources, FunctionDeclarationConverter, GeminiConfig, GeminiGateway,
    JsonlConversationLogger, SessionPool, StdioSessionConnector,
};
use mcpflow_presentation::{
    ChatRepl, Cli, ConsoleFormatter, LogLevel, OutputFormat, console_progress,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_FILE: &str = "mcpflow.log";

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mcpflow"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Console layer at the requested level (RUST_LOG overrides), plus a debug
/// log file unless disabled. The guard must live until exit.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let directive = match (cli.log_level, cli.verbose) {
        (None, v) if v >= 3 => "trace",
        _ => cli.console_log_level().directive(),
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let mut guard = None;
    let file = if cli.no_log_file {
        None
    } else {
        let dir = log_dir();
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let (writer, worker) =
                    tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, LOG_FILE));
                guard = Some(worker);
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(EnvFilter::new("debug")),
                )
            }
            Err(e) => {
                eprintln!("warning: log file disabled ({}): {}", dir.display(), e);
                None
            }
        }
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn open_transcript(path: Option<&Path>) -> Result<Option<Arc<dyn ConversationLogger>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let logger = JsonlConversationLogger::open(path)
        .with_context(|| format!("Cannot open transcript {}", path.display()))?;
    info!("Writing transcript to {}", logger.path().display());
    Ok(Some(Arc::new(logger) as Arc<dyn ConversationLogger>))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);

    info!("Starting mcpflow");

    // === Configuration ===
    let sources = ConfigSources {
        config: cli.config.clone(),
        mcp_config: cli.mcp_config.clone(),
        workflows_config: cli.workflows_config.clone(),
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(&sources);
        return Ok(());
    }

    let config = ConfigLoader::load(&sources).context("Failed to load configuration")?;

    if cli.list_workflows {
        print!(
            "{}",
            ConsoleFormatter::format_workflow_list(&config.workflow_summaries())
        );
        return Ok(());
    }

    match config.check() {
        Ok(warnings) => {
            for issue in warnings {
                warn!("{}", issue.message);
            }
        }
        Err(e) => {
            eprintln!("Configuration errors:");
            eprintln!("{}", ConsoleFormatter::format_issues(&e.issues));
            bail!("{} configuration error(s)", e.issues.len());
        }
    }

    let Some(workflow_name) = cli.workflow_name.as_deref() else {
        eprint!(
            "{}",
            ConsoleFormatter::format_workflow_list(&config.workflow_summaries())
        );
        bail!("No workflow given. Pass a workflow name, or --list-workflows.");
    };
    let resolved = config.resolve_workflow(workflow_name)?;

    // === Dependency Injection ===
    let mut gemini = GeminiConfig::from_env()
        .context("No Gemini API key: set GOOGLE_API_KEY or GEMINI_API_KEY")?;
    if let Some(api_base) = &config.gemini.api_base {
        gemini = gemini.with_api_base(api_base.as_str());
    }
    let gateway = Arc::new(GeminiGateway::new(gemini)?);

    // Before start_all: an error here must not leave servers running.
    let transcript = open_transcript(cli.transcript.as_deref())?;

    let (pool, report) = SessionPool::start_all(&resolved.servers, &StdioSessionConnector::new()).await;

    let cancel = CancellationToken::new();
    let mut use_case = RunQueryUseCase::new(
        gateway,
        Arc::new(pool),
        Arc::new(FunctionDeclarationConverter),
    )
    .with_execution_params(resolved.execution.clone())
    .with_cancellation(cancel.clone());
    if let Some(logger) = transcript {
        use_case = use_case.with_conversation_logger(logger);
    }

    let engine = WorkflowEngine::new(resolved.workflow, use_case);
    engine.accept_startup(&report).await?;

    if !cli.quiet && cli.output == OutputFormat::Text {
        eprint!("{}", ConsoleFormatter::format_tools(&engine.catalog()));
    }

    // Ctrl-C cancels the running query; the engine then closes the sessions.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted");
                cancel.cancel();
            }
        });
    }

    let verbose = cli.console_log_level() == LogLevel::Verbose;
    let outcome = match cli.query.as_deref() {
        Some(query) => {
            let progress = console_progress(!cli.quiet, verbose);
            match engine.run_query(query, progress.as_ref()).await {
                Ok(output) => {
                    match cli.output {
                        OutputFormat::Text => print!("{}", ConsoleFormatter::format_answer(&output)),
                        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&output)),
                    }
                    Ok(())
                }
                Err(e) => Err(anyhow::Error::new(e)),
            }
        }
        None => ChatRepl::new(&engine)
            .with_progress(!cli.quiet)
            .with_verbose(verbose)
            .with_output(cli.output)
            .run()
            .await
            .map_err(anyhow::Error::from),
    };

    if let Err(e) = engine.close().await {
        warn!("{}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_transcript_requested() {
        assert!(open_transcript(None).unwrap().is_none());
    }

    #[test]
    fn test_transcript_open_failure_is_reported() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let path = blocker.path().join("run.jsonl");
        let err = open_transcript(Some(&path)).err().unwrap();
        assert!(err.to_string().starts_with("Cannot open transcript"));
    }

    #[test]
    fn test_transcript_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        assert!(open_transcript(Some(&path)).unwrap().is_some());
    }
}
