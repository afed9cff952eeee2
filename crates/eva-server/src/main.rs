mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(eva_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = eva_db::PoolConfig::from_app_config(&config);
    let pool = eva_db::connect_pool(&config.database_url, pool_config).await?;
    eva_db::run_migrations(&pool).await?;

    seed_vendor_catalog(&pool, &config).await?;

    let geocoder = Arc::new(eva_geocode::GeocodeClient::new(
        &config.geocoder_base_url,
        config.geocoder_timeout_secs,
        &config.geocoder_user_agent,
        &config.geocoder_country_codes,
    )?);

    let app = build_app(AppState {
        pool,
        geocoder,
        search_fetch_limit: config.search_fetch_limit,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "eva-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Upsert the vendor catalog when the configured file exists; a missing file
/// just means the store is managed elsewhere.
async fn seed_vendor_catalog(
    pool: &sqlx::PgPool,
    config: &eva_core::AppConfig,
) -> anyhow::Result<()> {
    if !config.vendors_path.exists() {
        tracing::debug!(path = %config.vendors_path.display(), "no vendor catalog file; skipping seed");
        return Ok(());
    }

    let catalog = eva_core::load_vendors(&config.vendors_path)?;
    let count = eva_db::seed_vendors(pool, &catalog.vendors).await?;
    tracing::info!(count, "seeded vendor catalog");
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
