use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use giglet::{
    DatabasePool, MarketplaceStore, MemoryStore, ReputationManager,
    api::{ApiState, SecurityState, create_app},
    config::{GigletConfig, sanitize_for_logging},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GigletConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check the GIGLET_* environment variables.");
        e
    })?;

    init_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Giglet marketplace server");

    let store = build_store(&config).await?;
    let thresholds = config.reputation.to_thresholds();
    info!(
        early_access_step_minutes = thresholds.early_access_step_minutes,
        high_payout_cents = thresholds.high_payout_cents,
        "Reputation thresholds loaded"
    );
    let reputation = Arc::new(ReputationManager::new(store.clone(), thresholds));

    let state = ApiState::new(store, reputation, config.security.admin_api_key.clone());
    let security = SecurityState::new(config.middleware_config());

    let limiter = security.rate_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            limiter.cleanup();
        }
    });

    let app = create_app(state, security);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(addr = %bind_addr, "Giglet server listening");
    info!(
        auth = config.security.enable_auth,
        rate_limit_per_minute = config.security.rate_limit_per_minute,
        max_body_kb = config.security.max_request_size / 1024,
        "Security middleware configured"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_store(config: &GigletConfig) -> Result<Arc<dyn MarketplaceStore>> {
    if !config.database.postgres_enabled {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let url = if config.logging.sanitize_logs {
        sanitize_for_logging(&config.database.postgres_url)
    } else {
        config.database.postgres_url.clone()
    };
    info!(url = %url, "Connecting to PostgreSQL");

    let pool = DatabasePool::new(
        &config.database.postgres_url,
        config.database.max_connections,
    )
    .await
    .context("Failed to open PostgreSQL pool")?;
    pool.init_schema()
        .await
        .context("Failed to initialize database schema")?;
    Ok(Arc::new(pool))
}

fn init_logging(config: &GigletConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.logging.level)
        .with_context(|| format!("Invalid GIGLET_LOG_LEVEL: {}", config.logging.level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    if config.logging.sanitize_logs {
        info!("Logging initialized with client IP sanitization");
    }
    Ok(())
}
