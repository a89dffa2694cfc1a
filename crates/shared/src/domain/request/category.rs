use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::model::category::Category;
use crate::utils::{null_as_default, required_text};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct CreateCategoryRequest {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "required_text"), length(min = 3, max = 100))]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    #[validate(custom(function = "required_text"), length(min = 3, max = 100))]
    pub name: Option<String>,

    pub description: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
    }
}
