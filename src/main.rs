//! Council of Elders
//!
//! This is the main entry point for the council binary. Seven personas debate
//! a question over several rounds against a local or remote chat model, Merlin
//! synthesizes the debate, and the transcript is exported to disk.

mod backend;
mod cli;
mod config;
mod debate;
mod error;
mod export;
mod logging;
mod persona;
mod render;
mod version;

use std::io::IsTerminal;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::backend::ModelCatalog;
use crate::cli::{Cli, Commands, DebateArgs};
use crate::config::{CouncilConfig, DispatchMode};
use crate::debate::{DebateOrchestrator, DebateRequest, Dispatch, Transcript};
use crate::error::{Error, Result};
use crate::export::{JsonExporter, PdfExporter, TranscriptExporter};
use crate::persona::PersonaRegistry;
use crate::render::TerminalView;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => handle_config_command(subcommand),
        Commands::Personas { voice, config } => {
            let voice = match voice {
                Some(v) => v,
                None => CouncilConfig::load(config.as_deref())?.debate.voice,
            };
            let registry = PersonaRegistry::new(voice);
            let view = TerminalView::new(std::io::stdout().is_terminal(), registry);
            print!("{}", view.format_personas());
            Ok(())
        }
        Commands::Models { config } => {
            let config = CouncilConfig::load(config.as_deref())?;
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            build_runtime()?.block_on(list_models(config))
        }
        Commands::Debate(args) => run_debate(args, cli.verbose, cli.quiet),
    }
}

/// Build the multi-thread runtime shared by every async command
fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(num_cpus::get().clamp(2, 8))
        .thread_name("council")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))
}

/// Apply `debate` flags on top of the loaded configuration
fn apply_cli_overrides(config: &mut CouncilConfig, args: &DebateArgs) {
    if let Some(provider) = args.provider {
        config.model.provider = provider;
    }
    if let Some(voice) = args.voice {
        config.debate.voice = voice;
    }
    if args.sequential {
        config.debate.dispatch = DispatchMode::Sequential;
    }
    if let Some(ref dir) = args.output_dir {
        config.export.output_dir = shellexpand::tilde(dir).into_owned();
    }
    if args.no_pdf {
        config.export.pdf = false;
    }
    if args.json {
        config.export.json = true;
    }
}

fn run_debate(args: DebateArgs, verbose: u8, quiet: bool) -> Result<()> {
    let mut config = CouncilConfig::load(args.config.as_deref())?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, verbose, quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        provider = %config.model.provider,
        base_url = %config.model.base_url,
        "Starting council"
    );

    // Request errors outrank discovery errors
    let rounds = args.rounds.unwrap_or(config.debate.rounds);
    DebateOrchestrator::validate_question(&args.question, rounds)?;
    let requested_model = args.model.or_else(|| config.model.default_model.clone());

    build_runtime()?.block_on(debate_main(config, args.question, rounds, requested_model))
}

async fn debate_main(
    config: CouncilConfig,
    question: String,
    rounds: u32,
    requested_model: Option<String>,
) -> Result<()> {
    let catalog = ModelCatalog::discover(&config.model).await?;
    let model = catalog.select(requested_model.as_deref())?;
    let invoker = backend::build_invoker(&config.model, &model)?;

    let registry = PersonaRegistry::new(config.debate.voice);
    let dispatch = Dispatch::from_settings(config.debate.dispatch, config.debate.max_in_flight);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let view = TerminalView::new(std::io::stdout().is_terminal(), registry);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(text) = view.format_event(&event) {
                println!("{}", text);
            }
        }
    });

    let orchestrator = DebateOrchestrator::new(invoker, registry, dispatch).with_events(tx);
    let result = orchestrator
        .run(DebateRequest::new(question, rounds, model))
        .await;

    debug!(stage = ?orchestrator.stage(), "Debate finished");

    // Dropping the orchestrator closes the event channel
    drop(orchestrator);
    if let Err(e) = printer.await {
        warn!(error = %e, "Progress printer stopped early");
    }

    let transcript = result.map_err(|e| {
        if e.is_request_error() {
            warn!("{}", e.format_for_log());
        } else {
            error!("{}", e.format_for_log());
        }
        e
    })?;
    export_transcript(&config, &transcript)
}

fn export_transcript(config: &CouncilConfig, transcript: &Transcript) -> Result<()> {
    let mut exporters: Vec<Box<dyn TranscriptExporter>> = Vec::new();
    if config.export.pdf {
        exporters.push(Box::new(PdfExporter));
    }
    if config.export.json {
        exporters.push(Box::new(JsonExporter));
    }

    if exporters.is_empty() {
        info!("All exports disabled, transcript not saved");
        return Ok(());
    }

    let dir = config.output_dir();
    for exporter in &exporters {
        let path = export::write_export(
            &dir,
            &config.export.filename_prefix,
            exporter.as_ref(),
            transcript,
        )?;
        println!("Saved {} report: {}", exporter.format(), path.display());
    }

    Ok(())
}

async fn list_models(config: CouncilConfig) -> Result<()> {
    let catalog = ModelCatalog::discover(&config.model).await?;
    if catalog.models.is_empty() {
        return Err(Error::NoModelsAvailable {
            source_name: catalog.source,
        });
    }

    let default = config
        .model
        .default_model
        .clone()
        .or_else(|| catalog.models.first().cloned());

    println!("Models ({}):", catalog.source);
    for model in &catalog.models {
        let marker = if Some(model) == default.as_ref() { "*" } else { " " };
        println!(" {} {}", marker, model);
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: cli::ConfigSubcommand) -> Result<()> {
    use cli::ConfigSubcommand;

    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = CouncilConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let path = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", path.display());
        }
        ConfigSubcommand::Validate { config } => {
            CouncilConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
