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
        CategoriesEnvelope, CategoryEnvelope, CreateCategoryRequest, MessageResponse,
        UpdateCategoryRequest,
    },
    state::AppState,
};
use utoipa_axum::router::OpenApiRouter;

use super::{list_filters, with_location};
use crate::errors::{ApiError, write_json};
use crate::middleware::validate::{IdParam, ValidatedJson, check_expected_version};

#[utoipa::path(
    post,
    path = "/v1/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryEnvelope),
        (status = 400, description = "Malformed request body", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value),
        (status = 500, description = "Internal server error", body = serde_json::Value)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateCategoryRequest>,
) -> Result<Response, ApiError> {
    let category = state
        .di_container
        .category_repository
        .insert(&body)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let location = format!("/v1/api/categories/{}", category.id);
    let response = write_json(StatusCode::CREATED, &CategoryEnvelope::from(category));

    Ok(with_location(response, &location))
}

#[utoipa::path(
    get,
    path = "/v1/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = CategoryEnvelope),
        (status = 400, description = "Invalid id parameter", body = serde_json::Value),
        (status = 404, description = "Category not found", body = serde_json::Value)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
) -> Result<Response, ApiError> {
    let category = state.di_container.category_repository.get_by_id(id).await?;

    Ok(write_json(StatusCode::OK, &CategoryEnvelope::from(category)))
}

#[utoipa::path(
    get,
    path = "/v1/api/categories",
    params(
        ("id" = Option<String>, Query, description = "Comma separated category IDs"),
        ("name" = Option<String>, Query, description = "Full-text search on the name"),
        ("date_from" = Option<String>, Query, description = "RFC 3339 lower bound on created_at"),
        ("date_to" = Option<String>, Query, description = "RFC 3339 upper bound on created_at"),
        ("sort" = Option<String>, Query, description = "Comma separated sort keys, e.g. -created_at,name"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated categories", body = CategoriesEnvelope),
        (status = 400, description = "Malformed query parameters", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let filters = list_filters(query)?;

    let page = state
        .di_container
        .category_repository
        .get_all(&filters)
        .await?;

    Ok(write_json(StatusCode::OK, &CategoriesEnvelope::from(page)))
}

#[utoipa::path(
    patch,
    path = "/v1/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID"),
        ("X-Expected-Version" = Option<i32>, Header, description = "Version the update is based on")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryEnvelope),
        (status = 404, description = "Category not found", body = serde_json::Value),
        (status = 409, description = "Edit conflict", body = serde_json::Value),
        (status = 422, description = "Failed validation", body = serde_json::Value)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Response, ApiError> {
    let repository = &state.di_container.category_repository;

    let mut category = repository.get_by_id(id).await?;
    check_expected_version(&headers, category.version)?;

    body.apply_to(&mut category);
    let updated = repository.update(&category).await?;

    Ok(write_json(StatusCode::OK, &CategoryEnvelope::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/v1/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = serde_json::Value),
        (status = 409, description = "Category still referenced by products", body = serde_json::Value)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    IdParam(id): IdParam,
) -> Result<Response, ApiError> {
    state.di_container.category_repository.delete(id).await?;

    Ok(write_json(
        StatusCode::OK,
        &MessageResponse::new("category successfully deleted"),
    ))
}

pub fn category_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route(
            "/v1/api/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/v1/api/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .with_state(app_state)
}
