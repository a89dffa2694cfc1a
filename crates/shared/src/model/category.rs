use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}
