//! bookdesk server — answers queries over a locally cached book.
//!
//! On startup the book is loaded exactly once (from the local artifact, or
//! acquired from the remote fragments on a cache miss), then shared
//! immutably with the request handlers.

mod routes;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};

use bookdesk_assembler::BookAssembler;
use bookdesk_completion::CompletionClient;
use bookdesk_shared::{load_config, load_config_from, validate_api_key};

/// bookdesk — serve a book-grounded question-answering API.
#[derive(Parser)]
#[command(
    name = "bookdesk-server",
    version,
    about = "Serve a frontend and a query API over a locally cached book.",
    long_about = None,
)]
struct Cli {
    /// Path to a config file (defaults to ~/.bookdesk/bookdesk.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory with the static frontend files (overrides config).
    #[arg(long)]
    static_dir: Option<String>,

    /// Write a default config file to ~/.bookdesk/ and exit.
    #[arg(long)]
    init_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing based on CLI flags.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bookdesk_server=info,bookdesk_assembler=info,bookdesk_completion=info",
        1 => "bookdesk_server=debug,bookdesk_assembler=debug,bookdesk_completion=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.init_config {
        let path = bookdesk_shared::init_config()?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    validate_api_key(&config)?;

    let assembler = BookAssembler::new(&config.book)?;

    // The book is loaded once per process. A failed acquisition degrades to
    // an empty context rather than serving a partial document.
    let context = match assembler.load().await {
        Ok(text) => {
            info!(chars = text.len(), "book context loaded");
            text
        }
        Err(e) => {
            warn!(error = %e, "book could not be loaded, starting with empty context");
            String::new()
        }
    };

    let completion = CompletionClient::from_config(&config.completion)?;

    let static_dir = cli
        .static_dir
        .unwrap_or_else(|| config.server.static_dir.clone());
    let port = cli.port.unwrap_or(config.server.port);

    let state = routes::AppState::new(context, completion);
    let app = routes::router(state, &static_dir);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, %static_dir, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
