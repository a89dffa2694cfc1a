use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
};
use shared::{
    domain::{
        CreateProductRequest, MessageResponse, ProductEnvelope, ProductsEnvelope,
        UpdateProductRequest,
    },
    state::AppState,
};
use utoipa_axum::router::OpenApiRouter;

use super::{list_filters, with_location};
use crate::errors::{ApiError, write_json};
use crate::middleware::validate::{IdParam, ValidatedJson, check_expected_version};

#[utoipa::path(
    post,
    path = "/v1/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductEnvelope),
        (status = 400, description = "Malformed request body or unknown category_id", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value),
        (status = 500, description = "Internal server error", body = serde_json::Value)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateProductRequest>,
) -> Result<Response, ApiError> {
    let product = state
        .di_container
        .product_repository
        .insert(&body)
        .await?;

    let location = format!("/v1/api/products/{}", product.id);
    let response = write_json(StatusCode::CREATED, &ProductEnvelope::from(product));

    Ok(with_location(response, &location))
}

#[utoipa::path(
    get,
    path = "/v1/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product details", body = ProductEnvelope),
        (status = 400, description = "Invalid id parameter", body = serde_json::Value),
        (status = 404, description = "Product not found", body = serde_json::Value)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
) -> Result<Response, ApiError> {
    let product = state.di_container.product_repository.get_by_id(id).await?;

    Ok(write_json(StatusCode::OK, &ProductEnvelope::from(product)))
}

#[utoipa::path(
    get,
    path = "/v1/api/products",
    params(
        ("id" = Option<String>, Query, description = "Comma separated product IDs"),
        ("name" = Option<String>, Query, description = "Full-text search on the name"),
        ("date_from" = Option<String>, Query, description = "RFC 3339 lower bound on created_at"),
        ("date_to" = Option<String>, Query, description = "RFC 3339 upper bound on created_at"),
        ("sort" = Option<String>, Query, description = "Comma separated sort keys, e.g. -created_at,name"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated products", body = ProductsEnvelope),
        (status = 400, description = "Malformed query parameters", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let filters = list_filters(query)?;

    let page = state
        .di_container
        .product_repository
        .get_all(&filters)
        .await?;

    Ok(write_json(StatusCode::OK, &ProductsEnvelope::from(page)))
}

#[utoipa::path(
    patch,
    path = "/v1/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID"),
        ("X-Expected-Version" = Option<i32>, Header, description = "Version the update is based on")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductEnvelope),
        (status = 400, description = "Unknown category_id", body = serde_json::Value),
        (status = 404, description = "Product not found", body = serde_json::Value),
        (status = 409, description = "Edit conflict", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<UpdateProductRequest>,
) -> Result<Response, ApiError> {
    let repository = &state.di_container.product_repository;

    let mut product = repository.get_by_id(id).await?;
    check_expected_version(&headers, product.version)?;

    body.apply_to(&mut product);
    let updated = repository.update(&product).await?;

    Ok(write_json(StatusCode::OK, &ProductEnvelope::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/v1/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = serde_json::Value)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
) -> Result<Response, ApiError> {
    state.di_container.product_repository.delete(id).await?;

    Ok(write_json(
        StatusCode::OK,
        &MessageResponse::new("product successfully deleted"),
    ))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route(
            "/v1/api/products",
            get(list_products).post(create_product),
        )
        .route(
            "/v1/api/products/{id}",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .with_state(app_state)
}
