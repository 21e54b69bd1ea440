//! AIminer brain CLI.
//!
//! Runs the brain pipeline against a `brain.json` file, inspects the prompt
//! and parser in isolation, or serves the pipeline over HTTP.
//!
//! Usage:
//!   aiminer-brain process brain.json
//!   aiminer-brain prompt brain.json
//!   aiminer-brain parse "MOVE_TO 10 64 -5"
//!   aiminer-brain serve --port 8080

mod config;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aiminer_contracts::{error::BrainResult, outcome::ProcessOutcome};
use aiminer_core::{
    traits::{DocumentStore, PromptCompiler},
    BrainPipeline,
};
use aiminer_gateway::CompletionsGateway;
use aiminer_prompt::TemplateCompiler;
use aiminer_server::AppState;
use aiminer_store::FileDocumentStore;
use aiminer_verify::{CommandParser, SchemaDocumentDecoder};

use config::BrainConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// AIminer brain: turn a bot's state document into its next queued task.
#[derive(Parser)]
#[command(
    name = "aiminer-brain",
    version,
    about = "Turn an AIminer bot's brain state into its next queued task",
    long_about = "Compiles brain.json into a prompt, asks a local completion server for\n\
                  one action, and appends the parsed action to the task queue."
)]
struct Cli {
    /// Configuration file (defaults to ./aiminer.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Completion server base URL, e.g. http://127.0.0.1:1234.
    #[arg(long, global = true, value_name = "URL")]
    gateway_url: Option<String>,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline on a brain file and save it when a task is added.
    ///
    /// Exits 0 when a task was added and 1 otherwise.
    Process {
        /// Brain state document to read and update.
        brain: PathBuf,
    },
    /// Print the prompt compiled from a brain file.
    Prompt {
        brain: PathBuf,
    },
    /// Parse a completion and print the task it maps to.
    Parse {
        /// Completion text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Serve the pipeline over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = BrainConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(url) = cli.gateway_url {
        config.gateway.base_url = url;
    }

    match cli.command {
        Command::Process { brain } => run_process(&config, &brain),
        Command::Prompt { brain } => run_prompt(&config, &brain),
        Command::Parse { text } => run_parse(&config, &text.join(" ")),
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(&config)
        }
    }
}

/// Initialize tracing. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .compact()
        .init();
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn build_pipeline(config: &BrainConfig) -> Result<BrainPipeline> {
    let gateway = CompletionsGateway::new(config.gateway.clone())?;
    Ok(BrainPipeline::new(
        Box::new(TemplateCompiler::new(config.prompt)),
        Box::new(gateway),
        Box::new(CommandParser::new(config.parser)),
    )
    .with_decoder(Box::new(SchemaDocumentDecoder::new()?)))
}

fn open_store(path: &Path) -> Result<FileDocumentStore> {
    Ok(FileDocumentStore::new(path).with_decoder(Box::new(SchemaDocumentDecoder::new()?)))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_process(config: &BrainConfig, brain: &Path) -> Result<ExitCode> {
    let store = open_store(brain)?;
    let pipeline = build_pipeline(config)?;

    let outcome = process_document(&pipeline, &store)?;

    match &outcome.task {
        Some(task) if outcome.task_added => {
            info!(
                brain = %brain.display(),
                task_id = task.id,
                processing_time_ms = outcome.processing_time_ms,
                "brain updated"
            );
            println!("{}", serde_json::to_string_pretty(task)?);
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            warn!(
                brain = %brain.display(),
                completion = %outcome.completion,
                "no task added, brain file left unchanged"
            );
            eprintln!("No task added: could not parse '{}'", outcome.completion);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Load the document, run the pipeline on it, and save it back only when a
/// task was added.
fn process_document(
    pipeline: &BrainPipeline,
    store: &dyn DocumentStore,
) -> BrainResult<ProcessOutcome> {
    let outcome = pipeline.process(store.load()?)?;
    if outcome.task_added {
        store.save(&outcome.document)?;
    }
    Ok(outcome)
}

fn run_prompt(config: &BrainConfig, brain: &Path) -> Result<ExitCode> {
    let document = open_store(brain)?.load()?;
    let compiler = TemplateCompiler::new(config.prompt);
    println!("{}", compiler.compile(&document));
    Ok(ExitCode::SUCCESS)
}

fn run_parse(config: &BrainConfig, text: &str) -> Result<ExitCode> {
    let parser = CommandParser::new(config.parser);
    match parser.diagnose(text) {
        Ok(task) => {
            println!("{}", serde_json::to_string_pretty(&task)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            eprintln!("Rejected: {rejection}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_serve(config: &BrainConfig) -> Result<ExitCode> {
    // The pipeline owns a blocking HTTP client, which must not be dropped on
    // a runtime thread; this handle keeps the last drop out here.
    let pipeline = Arc::new(build_pipeline(config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")?;

    let served = runtime.block_on(aiminer_server::serve(
        &config.server,
        AppState::new(pipeline.clone()),
    ));
    drop(runtime);
    drop(pipeline);

    served?;
    Ok(ExitCode::SUCCESS)
}
