use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use askbox_core::{AnswerProvider, ChatRole, Config, Controller, ProviderKind};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "askbox")]
#[command(about = "Terminal chat box that asks an AI provider your questions", version)]
struct Cli {
    /// Answer provider: stub or http
    #[arg(short, long, global = true)]
    provider: Option<String>,
    /// Base URL of the backend serving POST /ask (http provider only)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,
    /// Write the effective provider and endpoint to the config file
    #[arg(long, global = true)]
    save: bool,
    /// Where to write logs (defaults to the local data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question without opening the chat window
    Ask {
        /// Your question
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let log_path = init_logging(cli.log_file.clone())?;

    let mut config = Config::load()?;
    if let Some(provider) = cli.provider.clone() {
        config.provider = Some(provider);
    }
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = Some(endpoint);
    }
    let save_path = if cli.save { Some(Config::path()?) } else { None };
    let (kind, provider) = select_provider(&config, save_path.as_deref())?;
    tracing::info!(
        provider = kind.as_str(),
        endpoint = config.endpoint.as_deref().unwrap_or("-"),
        log = %log_path.display(),
        "askbox starting"
    );

    match cli.command {
        Some(Commands::Ask { question }) => ask_once(provider, &question).await,
        None => run_tui(provider, kind).await.map(|()| ExitCode::SUCCESS),
    }
}

/// Build the configured provider, and only once that succeeds write the
/// configuration to `save_path`. A config that cannot start is never saved.
fn select_provider(config: &Config, save_path: Option<&Path>) -> Result<(ProviderKind, Arc<dyn AnswerProvider>)> {
    let kind = config.provider_kind()?;
    let provider = kind.build(config.endpoint.as_deref(), config.latency())?;

    if let Some(path) = save_path {
        config.save_to(path)?;
        eprintln!("Saved configuration to {}", path.display());
    }

    Ok((kind, provider))
}

fn init_logging(log_file: Option<PathBuf>) -> Result<PathBuf> {
    let path = match log_file {
        Some(path) => path,
        None => dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join("askbox")
            .join("askbox.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    // The terminal belongs to the TUI, so logs go to a file
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "askbox=info,askbox_core=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(path)
}

/// Run one submission through the controller and print what the
/// conversation ends up showing.
async fn ask_once(provider: Arc<dyn AnswerProvider>, question: &str) -> Result<ExitCode> {
    let mut controller = Controller::new(provider);
    let before = controller.state().conversation().len();
    controller.submit(question).await;

    if controller.state().conversation().len() == before {
        return Err(anyhow!("Nothing to ask: the question is empty"));
    }

    let reply = controller
        .state()
        .conversation()
        .last()
        .filter(|m| m.role() == ChatRole::Assistant)
        .ok_or_else(|| anyhow!("No reply was recorded"))?;

    if reply.is_error() {
        eprintln!("{}", reply.text());
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", reply.text());
    Ok(ExitCode::SUCCESS)
}

async fn run_tui(provider: Arc<dyn AnswerProvider>, kind: ProviderKind) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(Controller::new(provider), kind.display_name().to_string());
    let mut events = EventHandler::new();
    let tx = events.sender();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event, &tx),
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    tracing::info!(messages = app.state().conversation().len(), "askbox exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use askbox_core::StubProvider;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(provider: &str, endpoint: Option<&str>) -> Config {
        Config {
            provider: Some(provider.to_string()),
            endpoint: endpoint.map(str::to_string),
            latency_ms: Some(0),
        }
    }

    #[test]
    fn test_rejected_provider_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        assert!(select_provider(&config("bogus", None), Some(&path)).is_err());
        assert!(!path.exists());

        // http without an endpoint cannot start either
        assert!(select_provider(&config("http", None), Some(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_valid_provider_is_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let wanted = config("http", Some("http://localhost:8080"));

        let (kind, provider) = select_provider(&wanted, Some(&path)).unwrap();
        assert_eq!(kind, ProviderKind::Http);
        assert_eq!(provider.name(), "http");
        assert_eq!(Config::load_from(&path).unwrap(), wanted);
    }

    #[test]
    fn test_no_save_path_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (kind, _) = select_provider(&config("stub", None), None).unwrap();
        assert_eq!(kind, ProviderKind::Stub);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ask_once_exit_codes() {
        let stub = Arc::new(StubProvider::with_latency(Duration::ZERO));
        assert_eq!(ask_once(stub.clone(), "What is a closure?").await.unwrap(), ExitCode::SUCCESS);
        assert!(ask_once(stub, "   ").await.is_err());

        let broken = ProviderKind::Http.build(Some("http://127.0.0.1:1"), Duration::ZERO).unwrap();
        assert_eq!(ask_once(broken, "anything").await.unwrap(), ExitCode::FAILURE);
    }
}
