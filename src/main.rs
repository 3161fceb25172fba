use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_chat_web::api::ApiServer;
use voice_chat_web::{AudioClip, ChatSession, Config, HistoryStore, Locale, Orchestrator};

/// Voice Chat - browser front end for a remote voice-chat endpoint
#[derive(Parser)]
#[command(name = "voice-chat", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/voice-chat/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Voice-chat endpoint receiving uploads
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Chat history file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Directory for request and reply audio
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Language for the page and status messages (id, en)
    #[arg(long)]
    locale: Option<Locale>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the browser front end (default)
    Serve,
    /// Send one WAV file as a turn and record it in the history
    Send {
        /// WAV file to upload
        wav: PathBuf,
    },
    /// Print the recorded history
    History,
    /// Delete the recorded history
    ClearHistory,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voice_chat_web=info",
        1 => "info,voice_chat_web=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await.map(|()| ExitCode::SUCCESS),
        Command::Send { wav } => send(config, wav).await,
        Command::History => {
            print_history(&config);
            Ok(ExitCode::SUCCESS)
        }
        Command::ClearHistory => {
            let mut store = HistoryStore::open(&config.history_path);
            store.clear();
            println!("{}", config.locale.messages().cleared);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Apply command-line overrides on top of file and environment configuration
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(endpoint) = &cli.endpoint {
        config.upstream.endpoint.clone_from(endpoint);
    }
    if let Some(secs) = cli.timeout {
        config.upstream.timeout = Duration::from_secs(secs);
    }
    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = &cli.history {
        config.history_path.clone_from(path);
    }
    if let Some(dir) = &cli.artifact_dir {
        config.artifact_dir.clone_from(dir);
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    config.validate()?;
    config.ensure_dirs()?;
    Ok(config)
}

fn open_session(config: &Config) -> anyhow::Result<ChatSession> {
    let orchestrator = Orchestrator::from_config(config)?;
    let history = HistoryStore::open(&config.history_path);
    Ok(ChatSession::new(orchestrator, history, config.locale))
}

/// Serve the browser front end until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        endpoint = %config.upstream.endpoint,
        timeout_secs = config.upstream.timeout.as_secs(),
        history = %config.history_path.display(),
        artifact_dir = %config.artifact_dir.display(),
        locale = %config.locale,
        "starting voice chat front end"
    );

    let session = open_session(&config)?;
    ApiServer::new(session, config.server.host.clone(), config.server.port)
        .run()
        .await?;

    Ok(())
}

/// Send a WAV file as one turn
async fn send(config: Config, wav: PathBuf) -> anyhow::Result<ExitCode> {
    let bytes = tokio::fs::read(&wav).await?;
    let clip = AudioClip::from_wav(&bytes)?;
    println!(
        "Sending {:.1}s of audio ({} Hz, {} ch) to {}",
        clip.duration_secs(),
        clip.sample_rate,
        clip.channels,
        config.upstream.endpoint
    );

    let mut session = open_session(&config)?;

    // The blocking HTTP client must stay off the async worker threads
    let outcome = tokio::task::spawn_blocking(move || session.submit(Some(&clip))).await?;

    println!("{}", outcome.status);
    match outcome.audio_path {
        Some(path) => {
            println!("Reply audio: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

/// Print the recorded history
fn print_history(config: &Config) {
    let store = HistoryStore::open(&config.history_path);
    if store.is_empty() {
        println!("{}", config.locale.messages().empty_history);
        return;
    }

    for turn in store.turns() {
        match &turn.assistant_label {
            Some(reply) => println!("[{}] {} -> {reply}", turn.timestamp, turn.user_label),
            None => println!("[{}] {}", turn.timestamp, turn.user_label),
        }
    }
}
