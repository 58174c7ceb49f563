use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use multichat::catalog::ModelCatalog;
use multichat::commands;
use multichat::completion::CompletionClient;
use multichat::config::Config;
use multichat::session::ChatSession;
use multichat::ui::{self, ThemeMode};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multichat")]
#[command(version)]
#[command(about = "Chat with several LLMs through OpenRouter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model to start with (label, number, or model id)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Display theme
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Path to config file (default: ~/.multichat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models
    Models,
    /// Send a single message and print the reply
    Ask { prompt: Vec<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "multichat=debug" } else { "multichat=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The TUI owns the terminal, so its logs go to ~/.multichat/multichat.log
fn init_file_logging(verbose: bool) -> Result<()> {
    let dir = Config::home_dir();
    fs::create_dir_all(&dir).context("Failed to create .multichat directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("multichat.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => init_file_logging(cli.verbose)?,
        Some(_) => init_stderr_logging(cli.verbose),
    }

    // .env only feeds the environment; real variables are never overwritten
    dotenv::dotenv().ok();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let catalog = ModelCatalog::default();

    if let Some(Commands::Models) = cli.command {
        let selected = commands::listing_selection(&config_path, cli.model.as_deref(), &catalog);
        commands::list_models(&catalog, selected);
        return Ok(());
    }

    let config = Config::load_from(&config_path)?;

    let mut startup_model = config.startup_model(&catalog)?;
    if let Some(query) = cli.model.as_deref() {
        startup_model = catalog
            .resolve(query)
            .map(|entry| entry.label)
            .ok_or_else(|| multichat::ConfigError::UnknownModel(query.to_string()))?;
    }

    let api_key = match config.resolve_api_key() {
        Ok(key) => key,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let client = CompletionClient::openrouter(&api_key, config.cache.max_entries)?;
    let session = ChatSession::new(client, catalog, startup_model)?;
    tracing::info!(model = startup_model, "session started");

    match cli.command {
        Some(Commands::Ask { prompt }) => commands::ask(session, &prompt.join(" ")).await,
        _ => {
            let theme = match cli.theme {
                Some(ThemeArg::Dark) => ThemeMode::Dark,
                Some(ThemeArg::Light) => ThemeMode::Light,
                None if config.prefers_dark() => ThemeMode::Dark,
                None => ThemeMode::Light,
            };
            ui::run(session, theme).await
        }
    }
}
