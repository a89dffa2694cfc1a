use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Metadata;
use crate::model::category::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub version: i32,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        CategoryResponse {
            id: category.id,
            name: category.name,
            description: category.description,
            version: category.version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryEnvelope {
    pub category: CategoryResponse,
}

impl From<Category> for CategoryEnvelope {
    fn from(category: Category) -> Self {
        Self {
            category: category.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoriesEnvelope {
    pub categories: Vec<CategoryResponse>,
    pub metadata: Metadata,
}

impl From<(Vec<Category>, Metadata)> for CategoriesEnvelope {
    fn from((categories, metadata): (Vec<Category>, Metadata)) -> Self {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            metadata,
        }
    }
}
