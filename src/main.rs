use anyhow::Result;
use audioscribe::cli::{Cli, Commands, ConfigAction};
use audioscribe::config::Config;
use audioscribe::pipeline::TranscriptOutput;
use audioscribe::pipeline::orchestrator::{
    TranscriptionPipeline, TranscriptionRequest, WindowRequest,
};
use audioscribe::provider::ProviderKind;
use audioscribe::provider::transcriber::Task;
use clap::{CommandFactory, Parser};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Transcribe {
            file,
            chunk_size,
            overlap,
            language,
            task,
            provider,
            no_fast,
            timeout,
            json,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(timeout) = timeout {
                config.request.timeout_secs = timeout;
            }

            let mut request = TranscriptionRequest::new(file);
            request.chunk_size_secs = chunk_size.unwrap_or(config.chunking.chunk_size_secs);
            request.overlap_secs = overlap.unwrap_or(config.chunking.overlap_secs);
            request.language = language;
            request.task = parse_task(&task)?;
            request.provider = parse_provider(provider.as_deref())?;
            request.fast_mode = !no_fast;

            let pipeline = TranscriptionPipeline::new(&config);
            let spinner = start_spinner(cli.quiet, "Transcribing...");
            let result = pipeline.transcribe(request).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            render_output(&result?, json, cli.quiet)?;
        }
        Commands::Window {
            file,
            at,
            half_window,
            language,
            provider,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;

            let mut request = WindowRequest::new(file, at);
            request.half_window_secs = half_window;
            request.language = language;
            request.provider = parse_provider(provider.as_deref())?;

            let pipeline = TranscriptionPipeline::new(&config);
            let spinner = start_spinner(cli.quiet, "Transcribing window...");
            let result = pipeline.transcribe_window(request).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            render_output(&result?, json, cli.quiet)?;
        }
        Commands::Providers => {
            let config = load_config(cli.config.as_deref())?;
            list_providers(&config);
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "audioscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Initialize tracing to stderr, honoring RUST_LOG when set.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "audioscribe=warn",
        1 => "audioscribe=info",
        _ => "audioscribe=debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/audioscribe/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}

fn parse_task(task: &str) -> Result<Task> {
    task.parse::<Task>().map_err(|e| anyhow::anyhow!(e))
}

fn parse_provider(provider: Option<&str>) -> Result<Option<ProviderKind>> {
    match provider {
        Some(name) => {
            let kind = name.parse::<ProviderKind>().map_err(|e| anyhow::anyhow!(e))?;
            Ok(Some(kind))
        }
        None => Ok(None),
    }
}

/// Handle configuration inspection commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut config = load_config(custom_path)?;
            // Never print credentials
            if config.providers.groq_api_key.is_some() {
                config.providers.groq_api_key = Some("***".to_string());
            }
            if config.providers.openai_api_key.is_some() {
                config.providers.openai_api_key = Some("***".to_string());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Spinner on stderr while a job is in flight, unless quiet or piped.
fn start_spinner(quiet: bool, message: &str) -> Option<ProgressBar> {
    if quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

/// Print the transcript to stdout, metadata to stderr.
fn render_output(output: &TranscriptOutput, json: bool, quiet: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    println!("{}", output.transcript);

    if !quiet {
        let summary = format!(
            "{} mode, {} chunk(s), {} failed — {} ({}) in {:.1}s",
            output.mode,
            output.chunk_count,
            output.failed_count,
            output.service_used,
            output.model,
            output.processing_time_seconds
        );
        if output.failed_count > 0 {
            eprintln!("{}", summary.yellow());
        } else {
            eprintln!("{}", summary.dimmed());
        }
    }

    Ok(())
}

/// Show provider availability the way credentials resolve right now.
fn list_providers(config: &Config) {
    let pipeline = TranscriptionPipeline::new(config);
    let statuses = pipeline.provider_availability();

    println!(
        "Providers (preferred: {}):",
        config.providers.preferred.green()
    );
    for status in &statuses {
        if status.available {
            println!(
                "  {} {} ({}, {})",
                "●".green(),
                status.name,
                status.model,
                "available".green()
            );
        } else {
            println!(
                "  ○ {} ({}, {})",
                status.name,
                status.model,
                "not configured".dimmed()
            );
        }
    }

    if statuses.iter().all(|s| !s.available) {
        eprintln!();
        eprintln!("No provider is configured.");
        eprintln!("Set GROQ_API_KEY or OPENAI_API_KEY, or add keys to the config file.");
        std::process::exit(1);
    }
}
