use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http,
    middleware::Next,
    response::Response,
};
use shared::{
    state::AppState,
    utils::{Method, Status},
};
use tracing::{error, info};

use crate::errors::ErrorReport;

/// Logs every error response with the request method and URI. Server
/// faults log at ERROR, client errors at INFO.
pub async fn log_errors(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        if response.status().is_server_error() {
            error!(method = %method, uri = %uri, "{}", report.message);
        } else {
            info!(method = %method, uri = %uri, "{}", report.message);
        }
    }

    response
}

pub async fn track_metrics(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = metrics_method(request.method());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = if response.status().is_client_error() || response.status().is_server_error() {
        Status::Error
    } else {
        Status::Success
    };
    state
        .metrics
        .record(method, status, start.elapsed().as_secs_f64());

    response
}

fn metrics_method(method: &http::Method) -> Method {
    match method.as_str() {
        "GET" => Method::Get,
        "POST" => Method::Post,
        "PUT" => Method::Put,
        "PATCH" => Method::Patch,
        "DELETE" => Method::Delete,
        _ => Method::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_method() {
        assert_eq!(metrics_method(&http::Method::PATCH), Method::Patch);
        assert_eq!(metrics_method(&http::Method::OPTIONS), Method::Other);
    }
}
