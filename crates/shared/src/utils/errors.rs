use std::time::Duration;

use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("record not found")]
    NotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("category_id {0} does not exist")]
    InvalidCategoryId(i64),

    #[error("category {0} is still referenced by products")]
    CategoryInUse(i64),

    #[error("database operation exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("failed to build query: {0}")]
    QueryBuild(#[from] sea_query::error::Error),

    #[error("database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] MigrateError),
}
