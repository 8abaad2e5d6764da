use anyhow::Context;
use clap::Parser;
use hubspot_bridge::server::{router, AppState};
use hubspot_bridge::{hubspot_mappings, HubSpotConfig, HubSpotFetcher, HubSpotOAuth, MappingRegistry, MemoryCache};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HubSpot OAuth and item loading service
#[derive(Parser, Debug)]
#[command(name = "hubspot-bridge", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// JSON file of field mappings that replace the built-in ones per object type
    #[arg(long, env = "HUBSPOT_MAPPINGS")]
    mappings: Option<PathBuf>,
}

fn load_registry(path: Option<&PathBuf>) -> anyhow::Result<MappingRegistry> {
    let registry = hubspot_mappings().clone();
    let Some(path) = path else {
        return Ok(registry);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mappings from {}", path.display()))?;
    let overrides = MappingRegistry::from_json(&json)?;
    info!(
        "Loaded mapping overrides for: {}",
        overrides.object_types().collect::<Vec<_>>().join(", ")
    );
    Ok(registry.with_overrides(overrides))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Arc::new(HubSpotConfig::from_env()?);
    info!("Starting hubspot-bridge with {:?}", config);

    let registry = Arc::new(load_registry(args.mappings.as_ref())?);
    let oauth = HubSpotOAuth::new(config.clone(), Arc::new(MemoryCache::new()))?;
    let fetcher = HubSpotFetcher::new(&config, registry)?;
    let app = router(AppState::new(oauth, fetcher));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Listening on http://{}", args.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
