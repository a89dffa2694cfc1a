use axum::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shared::utils::{AppError, DecodeError, FieldErrors};
use thiserror::Error;
use validator::ValidationErrors;

const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
const INVALID_CATEGORY_MESSAGE: &str = "invalid category_id";
const CATEGORY_IN_USE_MESSAGE: &str = "the category is still referenced by existing products";
const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed validation: {}", .0.summary())]
    FailedValidation(FieldErrors),

    #[error("invalid id parameter: {0}")]
    InvalidIdParam(String),

    #[error("{}", .0.summary())]
    InvalidQuery(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{}", EDIT_CONFLICT_MESSAGE)]
    EditConflict,

    #[error("{}", INVALID_CATEGORY_MESSAGE)]
    InvalidCategoryId,

    #[error("{}", CATEGORY_IN_USE_MESSAGE)]
    CategoryInUse,

    /// Carries the internal detail for the log; clients get a fixed message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_)
            | ApiError::InvalidIdParam(_)
            | ApiError::InvalidQuery(_)
            | ApiError::BadRequest(_)
            | ApiError::InvalidCategoryId => StatusCode::BAD_REQUEST,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EditConflict | ApiError::CategoryInUse => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => ApiError::NotFound,
            AppError::EditConflict => ApiError::EditConflict,
            AppError::InvalidCategoryId(_) => ApiError::InvalidCategoryId,
            AppError::CategoryInUse(_) => ApiError::CategoryInUse,
            AppError::Timeout(_)
            | AppError::QueryBuild(_)
            | AppError::SqlxError(_)
            | AppError::MigrateError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::FailedValidation(FieldErrors::from(&errors))
    }
}

/// Message attached to an error response for the request logging layer.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a, T: Serialize> {
    error: &'a T,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let report = ErrorReport {
            message: self.to_string(),
        };

        let mut response = match &self {
            ApiError::FailedValidation(fields) | ApiError::InvalidQuery(fields) => {
                write_json(status, &ErrorBody { error: fields })
            }
            ApiError::Internal(_) => write_json(
                status,
                &ErrorBody {
                    error: &SERVER_ERROR_MESSAGE,
                },
            ),
            _ => write_json(
                status,
                &ErrorBody {
                    error: &report.message,
                },
            ),
        };

        response.extensions_mut().insert(report);
        response
    }
}

/// Writes `body` as indented JSON followed by a newline. A body that fails
/// to serialize becomes an empty 500.
pub fn write_json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec_pretty(body) {
        Ok(mut bytes) => {
            bytes.push(b'\n');
            (
                status,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
            response.extensions_mut().insert(ErrorReport {
                message: format!("failed to serialize response body: {err}"),
            });
            response
        }
    }
}
