use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::model::product::Product;
use crate::utils::{null_as_default, required_text};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct CreateProductRequest {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "required_text"), length(min = 3, max = 100))]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    #[validate(range(min = 1, code = "required"))]
    pub category_id: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(deserialize_with = "null_as_default")]
    #[validate(range(min = 0.0))]
    pub price: f64,

    #[serde(deserialize_with = "null_as_default")]
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "required_text"), length(min = 3, max = 100))]
    pub name: Option<String>,

    #[validate(range(min = 1))]
    pub category_id: Option<i64>,

    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
}

impl UpdateProductRequest {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{FieldErrors, decode_json};
    use serde_json::json;

    #[test]
    fn test_reports_every_failing_field() {
        let body = format!(
            r#"{{"name": "{}", "price": -1, "quantity": -4}}"#,
            "x".repeat(101)
        );
        let request: CreateProductRequest = decode_json(body.as_bytes()).unwrap();
        let errors = FieldErrors::from(&request.validate().unwrap_err());

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "category_id": "is required",
                "name": "must be at most 100 characters long",
                "price": "must be greater than or equal to 0",
                "quantity": "must be greater than or equal to 0",
            })
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let request: CreateProductRequest =
            decode_json(br#"{"name": "Espresso", "category_id": 4}"#).unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.description, "");
        assert_eq!(request.price, 0.0);
        assert_eq!(request.quantity, 0);
    }

    #[test]
    fn test_price_type_mismatch() {
        let err = decode_json::<CreateProductRequest>(
            br#"{"name": "Espresso", "category_id": 4, "price": "free"}"#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "body contains incorrect JSON type for field \"price\""
        );
    }

    #[test]
    fn test_null_fields_reach_validation() {
        let request: CreateProductRequest = decode_json(
            br#"{"name": "Espresso", "category_id": null, "price": null, "quantity": 2}"#,
        )
        .unwrap();
        let errors = FieldErrors::from(&request.validate().unwrap_err());

        assert_eq!(request.price, 0.0);
        assert_eq!(errors.get("category_id"), Some("is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_oversized_price_is_type_mismatch() {
        let err = decode_json::<CreateProductRequest>(
            br#"{"name": "Espresso", "category_id": 4, "price": 1e999}"#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "body contains incorrect JSON type for field \"price\""
        );
    }

    #[test]
    fn test_update_rules() {
        let request: UpdateProductRequest =
            decode_json(br#"{"category_id": 0, "quantity": -1}"#).unwrap();
        let errors = FieldErrors::from(&request.validate().unwrap_err());

        assert_eq!(
            errors.get("category_id"),
            Some("must be greater than or equal to 1")
        );
        assert_eq!(
            errors.get("quantity"),
            Some("must be greater than or equal to 0")
        );
        assert!(errors.get("name").is_none());
    }
}
