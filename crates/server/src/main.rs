use anyhow::{Context, Result};
use products_server::handler::AppRouter;
use shared::{
    config::{Config, ConnectionManager},
    state::AppState,
    utils::init_logger,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_logger("products_server");

    let config = Config::init().context("Failed to load configuration")?;

    let db_pool = ConnectionManager::new_pool(&config)
        .await
        .context("Failed to initialize database pool")?;

    info!(env = %config.env, port = config.port, "Starting server");

    let state = AppState::new(db_pool, config.query_timeout);

    AppRouter::serve(config.port, state).await
}
