use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opusgate_core::{
    create_authenticator, load_config, load_config_from_env, validate_config, ArtifactStore,
    Authenticator, Config, ConversionService, FfmpegTranscoder, HttpFetcher, InputAcquirer,
    SanitizedConfig, Transcoder,
};
use opusgate_server::{create_router, AppState};

/// Config file used when `OPUSGATE_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
    match transcoder.validate().await {
        Ok(()) => info!("Transcoder ready: {}", transcoder.name()),
        // Conversions will fail until ffmpeg is installed; health still answers.
        Err(e) => warn!("Transcoder validation failed: {}", e),
    }

    let fetcher = HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?;

    let artifacts = ArtifactStore::new(
        config.transcoder.artifact_dir.clone(),
        transcoder.profile().extension,
    );
    artifacts.ensure_dir().await.with_context(|| {
        format!("Failed to create artifact directory {:?}", artifacts.dir())
    })?;
    info!("Artifacts are written to {:?}", artifacts.dir());

    let conversions =
        ConversionService::new(InputAcquirer::new(Arc::new(fetcher)), transcoder, artifacts);

    let state = Arc::new(AppState::new(config.clone(), authenticator, conversions));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Loads the config file named by `OPUSGATE_CONFIG`, or `config.toml`.
///
/// Without the variable a missing default file is not an error; the
/// environment alone is used.
fn load() -> Result<Config> {
    if let Ok(path) = std::env::var("OPUSGATE_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No {} found, using environment only", DEFAULT_CONFIG_PATH);
        load_config_from_env().context("Failed to load config from environment")
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
