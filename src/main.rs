//! Shelfscroll Server - library catalog REST API

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shelfscroll::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfscroll={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    tracing::info!("Starting Shelfscroll Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let services = Services::new(Repository::new(pool), config.catalog.clone());

    let app = api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    });

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
