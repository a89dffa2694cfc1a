use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pagination details for a list response. Zero fields are omitted, so an
/// empty result serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Metadata::default();
        }

        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
