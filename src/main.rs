//! movie-search: paginated movie search over the OMDb API
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use movie_search::{
    config::{self, DetailStrategy, Settings},
    network::HttpClient,
    provider::Omdb,
    web::{create_router, AppState},
    PageOutcome, ResultAggregator,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "movie-search", version, about = "Paginated movie search over the OMDb API")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the search proxy server (default)
    Serve,
    /// Search from the terminal, loading pages until exhausted or the limit
    Search {
        /// Search term
        term: String,
        /// Maximum number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
        /// Fetch detail records for every result
        #[arg(short, long)]
        details: bool,
        /// Keep only the most recent N results
        #[arg(short, long)]
        window: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load(cli.config.as_deref())?;

    init_logging(&settings);
    info!("Starting movie-search v{}", movie_search::VERSION);

    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings, client).await,
        Command::Search {
            term,
            pages,
            details,
            window,
        } => {
            if details {
                settings.aggregator.detail_strategy = DetailStrategy::Eager;
            }
            if window.is_some() {
                settings.aggregator.retain_window = window;
            }
            settings.validate()?;
            search(&settings, client, &term, pages).await
        }
    }
}

/// Initialize logging; `RUST_LOG` wins over the debug flag
fn init_logging(settings: &Settings) {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn serve(settings: Settings, client: HttpClient) -> Result<()> {
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    let state = AppState::new(settings, client)?;
    info!("Application state initialized for {}", state.instance_name());

    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn search(settings: &Settings, client: HttpClient, term: &str, pages: u32) -> Result<()> {
    let provider = Omdb::from_settings(&settings.provider, client)?;
    let aggregator = ResultAggregator::new(Arc::new(provider), &settings.aggregator);

    let mut outcome = aggregator.start_search(term).await;
    let mut loaded = 1;
    while loaded < pages && matches!(outcome, PageOutcome::Loaded { .. }) {
        outcome = aggregator.request_more().await;
        loaded += 1;
    }

    let state = aggregator.state();
    for (position, (item, detail)) in state.entries().enumerate() {
        println!(
            "{:>3}. {} ({}) [{}] {}",
            position + 1,
            item.title,
            item.year,
            item.kind,
            item.id
        );
        if let Some(detail) = detail {
            println!("     Genre:    {}", detail.genre);
            println!("     Director: {}", detail.director);
            println!("     Plot:     {}", detail.plot);
        }
    }

    if let Some(error) = state.error {
        eprintln!("{}", error);
    } else if state.items.is_empty() {
        eprintln!("No results.");
    } else if state.has_more {
        info!("More results available after page {}", state.page);
    }

    Ok(())
}
