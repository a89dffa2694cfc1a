use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CreateCategoryRequest, Filters, Metadata};
use crate::model::category::Category;
use crate::utils::AppError;

pub type DynCategoryRepository = Arc<dyn CategoryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CategoryRepositoryTrait {
    /// Stores a new category; id, created_at and version come from the database.
    async fn insert(&self, input: &CreateCategoryRequest) -> Result<Category, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Category, AppError>;

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Category>, Metadata), AppError>;

    /// Writes `category` only if the stored version still equals
    /// `category.version`, returning the row with its new version.
    /// A stale version yields [`AppError::EditConflict`].
    async fn update(&self, category: &Category) -> Result<Category, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
