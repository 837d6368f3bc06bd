mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use blcdb_store::{LocalStore, PgStore, RecordStore};
use blcdb_vision::VisionClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(blcdb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // The store backend is decided exactly once, here.
    let store: Arc<dyn RecordStore> = match config.store {
        blcdb_core::StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let pool_config = blcdb_db::PoolConfig::from_app_config(&config);
            let pool = blcdb_db::connect_pool(database_url, pool_config).await?;
            blcdb_db::run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        blcdb_core::StoreBackend::Local => {
            tracing::warn!(
                dir = %config.local_store_dir.display(),
                "running against the local fallback store (demo mode)"
            );
            Arc::new(LocalStore::open(&config.local_store_dir)?)
        }
    };

    let seed = match blcdb_store::load_seed_catalog(&config.seed_path) {
        Ok(seed) => seed,
        Err(error) => {
            tracing::warn!(%error, "seed catalog unavailable; fallback listing will be empty");
            Vec::new()
        }
    };

    let vision = match config.vision_api_key.as_deref() {
        Some(key) => {
            let client = match config.vision_base_url.as_deref() {
                Some(base) => VisionClient::with_base_url(key, config.vision_timeout_secs, base)?,
                None => VisionClient::new(key, config.vision_timeout_secs)?,
            };
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("BLCDB_VISION_API_KEY not set; scan endpoint disabled");
            None
        }
    };

    let is_development = matches!(config.env, blcdb_core::Environment::Development);
    let auth = AuthState::from_env(is_development)?;
    let app = build_app(
        AppState::new(store, seed, vision),
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, store = %config.store, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
