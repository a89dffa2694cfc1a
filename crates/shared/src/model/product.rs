use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}
