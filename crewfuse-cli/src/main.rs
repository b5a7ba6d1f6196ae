//! Crewfuse CLI - research crew runner
//!
//! Runs the two-stage research crew against an OpenAI-compatible backend and
//! reports the run to Langfuse.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use crewfuse::chat::SharedChatProvider;
use crewfuse::crew::CrewOutput;
use crewfuse::error::{Error, Result};
use crewfuse::llms::OpenAI;
use crewfuse::orchestrator::SequentialOrchestrator;
use crewfuse::research::{build_research_crew, run_research};
use crewfuse::task::TaskDescriptor;
use crewfuse::trace::{LangfuseCollector, MemoryCollector, SharedTraceCollector};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use config::{Overrides, load_settings};
use console::ConsoleHooks;

/// Crewfuse - sequential research crew with Langfuse tracing
#[derive(Parser)]
#[command(name = "crewfuse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CREWFUSE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the research crew
    Run(RunArgs),

    /// Print the assembled pipeline without running it
    Plan(PlanArgs),

    /// Show configuration and environment status
    Status,
}

/// Arguments for the run command
#[derive(Args)]
struct RunArgs {
    /// Topic to narrow the research and the report to
    #[arg(short, long)]
    topic: Option<String>,

    /// Model to use (overrides config and `OPENAI_MODEL`)
    #[arg(short, long)]
    model: Option<String>,

    /// Keep traces local instead of sending them to Langfuse
    #[arg(long)]
    no_trace: bool,
}

/// Arguments for the plan command
#[derive(Args)]
struct PlanArgs {
    /// Topic to narrow the research and the report to
    #[arg(short, long)]
    topic: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "crewfuse_cli={level},crewfuse={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => cmd_run(args, cli.config).await,
        Commands::Plan(args) => {
            cmd_plan(&args);
            Ok(())
        }
        Commands::Status => cmd_status(cli.config).await,
    }
}

/// Run the research crew and flush traces whatever the outcome.
async fn cmd_run(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let overrides = Overrides {
        model: args.model,
        no_trace: args.no_trace,
    };
    let settings = load_settings(config_path.as_deref(), &overrides)
        .await
        .map_err(|e| Error::config(format!("failed to load config: {e}")))?;

    let collector: SharedTraceCollector = if settings.tracing_enabled {
        Arc::new(LangfuseCollector::new(settings.langfuse.clone())?)
    } else {
        tracing::info!("Langfuse disabled; traces stay local");
        Arc::new(MemoryCollector::new())
    };

    let host = settings
        .tracing_enabled
        .then_some(settings.langfuse.host.as_str());
    let provider: SharedChatProvider = match OpenAI::new(settings.llm.clone()) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            console::completion(Err(&e), host);
            return Err(e);
        }
    };

    run_with(
        provider,
        settings.temperature,
        collector,
        args.topic.as_deref(),
        host,
    )
    .await
    .map(|_| ())
}

/// Runs the crew under a trace session between the start and completion
/// banners.
///
/// The returned error is the crew's if it failed, otherwise the flush error;
/// either way the process exits non-zero.
async fn run_with(
    provider: SharedChatProvider,
    temperature: Option<f32>,
    collector: SharedTraceCollector,
    topic: Option<&str>,
    langfuse_host: Option<&str>,
) -> Result<CrewOutput> {
    let mut orchestrator =
        SequentialOrchestrator::new(provider).hooks(Arc::new(ConsoleHooks::default()));
    if let Some(temperature) = temperature {
        orchestrator = orchestrator.temperature(temperature);
    }

    console::banner("STARTING CREWFUSE MULTI-AGENT SYSTEM");
    let result = run_research(&orchestrator, &ConsoleHooks::default(), collector, topic).await;
    console::completion(result.as_ref().map(|_| ()), langfuse_host);

    result
}

/// Print the pipeline that `run` would execute.
fn cmd_plan(args: &PlanArgs) {
    let crew = build_research_crew(args.topic.as_deref());

    println!(
        "Crew '{}' ({}, {} agents, {} tasks)\n",
        crew.name(),
        crew.execution_process(),
        crew.agent_list().len(),
        crew.task_list().len()
    );

    for (index, task) in crew.task_list().iter().enumerate() {
        print_task(index, task);
    }
}

fn print_task(index: usize, task: &TaskDescriptor) {
    let agent = task.agent();
    println!("Stage {}: {}", index + 1, agent.role());
    println!("  Goal:       {}", agent.goal());
    println!(
        "  Delegation: {}",
        if agent.allows_delegation() { "allowed" } else { "no" }
    );
    println!("  Expected:   {}", task.expected_output());
    println!("  Description:");
    for line in task.description().lines() {
        println!("    {line}");
    }
    println!();
}

/// Show status.
async fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let config_file = config_path.unwrap_or_else(config::config_path);

    println!("Crewfuse Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match load_settings(Some(config_file.as_path()), &Overrides::default()).await {
        Ok(settings) => {
            println!("  Valid:  yes");
            println!();
            println!("LLM:");
            println!("  Base URL: {}", settings.llm.base_url);
            println!("  Model:    {}", settings.llm.model);
            println!(
                "  API key:  {}",
                if settings.llm.api_key.is_some() { "set" } else { "none" }
            );
            println!();
            println!("Langfuse:");
            println!("  Host:    {}", settings.langfuse.host);
            println!(
                "  Tracing: {}",
                if settings.tracing_enabled { "enabled" } else { "disabled" }
            );
            println!(
                "  Keys:    {}",
                if settings.langfuse.is_placeholder() { "placeholder" } else { "set" }
            );
        }
        Err(e) => {
            println!("  Valid:  no ({e})");
        }
    }

    println!();
    println!("Environment:");
    for name in [
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_MODEL",
        "LANGFUSE_PUBLIC_KEY",
        "LANGFUSE_SECRET_KEY",
        "LANGFUSE_HOST",
    ] {
        print_env_status(name);
    }

    Ok(())
}

fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::clone_on_ref_ptr)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use crewfuse::llms::MockProvider;

    #[tokio::test]
    async fn lost_traces_fail_an_otherwise_good_run() {
        let provider = Arc::new(MockProvider::new(["notes", "report"]));
        let collector = Arc::new(MemoryCollector::new().fail_flush());

        let err = run_with(provider, None, collector, None, Some("http://localhost:3000"))
            .await
            .unwrap_err();

        assert!(err.is_trace());
    }

    #[tokio::test]
    async fn crew_fault_wins_over_flush_result() {
        let provider = Arc::new(MockProvider::new(["notes", "report"]).fail_on(0));
        let collector = Arc::new(MemoryCollector::new().fail_flush());

        let err = run_with(provider, Some(0.2), collector, Some("robotics"), None)
            .await
            .unwrap_err();

        assert!(!err.is_trace());
    }

    #[tokio::test]
    async fn clean_run_returns_the_report() {
        let provider = Arc::new(MockProvider::new(["notes", "report"]));
        let collector = Arc::new(MemoryCollector::new());

        let output = run_with(provider, None, collector.clone(), None, None)
            .await
            .unwrap();

        assert_eq!(output.raw, "report");
        assert_eq!(collector.flush_count(), 1);
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "crewfuse",
            "-vv",
            "run",
            "--topic",
            "quantum computing",
            "--model",
            "llama3.1",
            "--no-trace",
        ]);

        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.topic.as_deref(), Some("quantum computing"));
        assert_eq!(args.model.as_deref(), Some("llama3.1"));
        assert!(args.no_trace);
    }

    #[test]
    fn plan_without_topic() {
        let cli = Cli::parse_from(["crewfuse", "plan"]);
        let Commands::Plan(args) = cli.command else {
            panic!("expected the plan command");
        };
        assert!(args.topic.is_none());
    }
}
