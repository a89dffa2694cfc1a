mod category;
mod product;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Query, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE, header::LOCATION},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::{domain::Filters, state::AppState, utils::MAX_BODY_BYTES};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::log::{log_errors, track_metrics};

pub use self::category::category_routes;
pub use self::product::product_routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        category::create_category,
        category::get_category,
        category::list_categories,
        category::update_category,
        category::delete_category,
        product::create_product,
        product::get_product,
        product::list_products,
        product::update_product,
        product::delete_product,
    ),
    tags(
        (name = "categories", description = "Category management endpoints."),
        (name = "products", description = "Product management endpoints.")
    )
)]
struct ApiDoc;

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let mut buffer = String::new();
    encode(&mut buffer, &state.registry)
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {e}")))?;

    Ok((
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Parses and validates the list query string shared by every collection
/// endpoint.
pub(crate) fn list_filters(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Filters, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let filters = Filters::from_query(&params).map_err(ApiError::InvalidQuery)?;
    filters.validate()?;

    Ok(filters)
}

pub(crate) fn with_location(mut response: Response, location: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

pub struct AppRouter;

impl AppRouter {
    /// Assembles the API routes, docs, fallback and middleware stack.
    pub fn build(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);

        let mut router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone());

        router = router.merge(category_routes(shared_state.clone()));
        router = router.merge(product_routes(shared_state.clone()));

        let (router, api) = router.split_for_parts();

        router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .fallback(not_found)
            .layer(middleware::from_fn(log_errors))
            .layer(middleware::from_fn_with_state(shared_state, track_metrics))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(port: u16, app_state: AppState) -> anyhow::Result<()> {
        let router = Self::build(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(addr = %listener.local_addr()?, "Server running");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
