use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CreateProductRequest, Filters, Metadata};
use crate::model::product::Product;
use crate::utils::AppError;

pub type DynProductRepository = Arc<dyn ProductRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ProductRepositoryTrait {
    /// Fails with [`AppError::InvalidCategoryId`] when the category is missing.
    async fn insert(&self, input: &CreateProductRequest) -> Result<Product, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Product, AppError>;

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Product>, Metadata), AppError>;

    async fn update(&self, product: &Product) -> Result<Product, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
