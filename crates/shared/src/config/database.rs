use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use tracing::info;

use super::Config;
use crate::utils::AppError;

pub type ConnectionPool = Pool<Postgres>;

pub struct ConnectionManager;

impl ConnectionManager {
    pub async fn new_pool(config: &Config) -> Result<ConnectionPool, AppError> {
        let pool = pool_options(config).connect(&config.database_url).await?;

        if config.run_migrations {
            info!("Running database migrations");
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        info!(
            max_connections = config.db_max_open_conns,
            "Database connection pool established"
        );

        Ok(pool)
    }
}

// sqlx has no cap on idle connections; idle ones are closed after
// `db_max_idle_time` and the pool keeps no minimum open.
fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_open_conns)
        .min_connections(0)
        .idle_timeout(config.db_max_idle_time)
}
