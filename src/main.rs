//! research-search: multi-provider search API server
//!
//! This is the main entry point for the application.

use anyhow::{bail, Context, Result};
use research_search::{
    config,
    network::HttpClient,
    providers::ProviderLoader,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let Some(config_path) = parse_args()? else {
        return Ok(());
    };

    // Load configuration
    let settings = config::load(config_path.as_deref())?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting research-search v{}", research_search::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    settings.validate()?;

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Load providers
    let registry = ProviderLoader::load(&settings, &client);
    if registry.is_empty() {
        warn!("No search providers configured; every search will fail");
    }
    info!(
        "Loaded {} search providers, strategy {}",
        registry.len(),
        settings.search.strategy
    );

    // Bind address
    let addr = SocketAddr::new(
        settings
            .server
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind address: {}", settings.server.bind_address))?,
        settings.server.port,
    );

    // Create application state and router
    let state = AppState::new(settings, registry);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse command line arguments. Returns `None` when the process should
/// exit after printing help or version.
fn parse_args() -> Result<Option<Option<PathBuf>>> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("{} requires a file path", arg),
            },
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("research-search {}", research_search::VERSION);
                return Ok(None);
            }
            other => bail!("unknown argument: {} (see --help)", other),
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
research-search v{}
Multi-provider web search API (Tavily primary, SerpAPI fallback)

USAGE:
    research-search [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    RESEARCH_SEARCH_SETTINGS_PATH  Path to settings.yml
    TAVILY_API_KEY                 Tavily API key
    SERP_API_KEY                   SerpAPI key
    SEARCH_STRATEGY                tavily_only, serp_only or intelligent
    MAX_SEARCH_RESULTS             Default results per query (1-50)
    SEARCH_TIMEOUT                 Timeout per provider in seconds (5-120)
    PORT                           Server port
    BIND_ADDRESS                   Bind address
    LOG_LEVEL                      Log level (overridden by RUST_LOG)
"#,
        research_search::VERSION
    );
}
