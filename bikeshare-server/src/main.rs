use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bikeshare_server::gbfs::{FeedError, GbfsClient, GbfsClientConfig};
use bikeshare_server::registry::{RegistryError, SystemRegistry};
use bikeshare_server::settings::{SETTINGS_ENV, Settings, SettingsError};
use bikeshare_server::web::{AppState, create_router};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("{path}: {source}")]
    Settings {
        path: String,
        source: SettingsError,
    },

    #[error("cannot create feed client: {0}")]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let path = Settings::locate(std::env::args().nth(1), std::env::var(SETTINGS_ENV).ok());
    info!(%path, "loading settings");
    let settings = Settings::load(&path).map_err(|source| StartupError::Settings {
        path: path.clone(),
        source,
    })?;

    let client = Arc::new(GbfsClient::new(
        GbfsClientConfig::new().with_timeout(settings.request_timeout_secs),
    )?);

    let mut registry = SystemRegistry::new();
    for (system, config) in settings.engine_configs() {
        info!(%system, url = %config.manifest_url, "starting engine");
        registry.start(system, config, Arc::clone(&client))?;
    }

    let state = AppState::new(registry);
    let registry = Arc::clone(&state.registry);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    info!(addr = %settings.listen_addr, systems = registry.len(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    registry.shutdown_all();
    Ok(())
}
