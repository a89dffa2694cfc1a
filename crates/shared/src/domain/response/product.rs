use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Metadata;
use crate::model::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub version: i32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            id: product.id,
            name: product.name,
            category_id: product.category_id,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            version: product.version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductEnvelope {
    pub product: ProductResponse,
}

impl From<Product> for ProductEnvelope {
    fn from(product: Product) -> Self {
        Self {
            product: product.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductsEnvelope {
    pub products: Vec<ProductResponse>,
    pub metadata: Metadata,
}

impl From<(Vec<Product>, Metadata)> for ProductsEnvelope {
    fn from((products, metadata): (Vec<Product>, Metadata)) -> Self {
        Self {
            products: products.into_iter().map(Into::into).collect(),
            metadata,
        }
    }
}
