use axum::{
    body::Bytes,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{BytesRejection, FailedToBufferBody},
    },
    http::{HeaderMap, request::Parts},
};
use serde::de::DeserializeOwned;
use shared::utils::{DecodeError, MAX_BODY_BYTES, decode_json};
use validator::Validate;

use crate::errors::ApiError;

/// Header a client sends to make an update conditional on the version it
/// last read.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// JSON body decoded strictly and then checked against its field rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
                    ApiError::Decode(DecodeError::BodyTooLarge {
                        limit: MAX_BODY_BYTES,
                    })
                }
                other => ApiError::BadRequest(other.body_text()),
            })?;

        let value: T = decode_json(&bytes)?;
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Positive integer `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub i64);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        match raw.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(IdParam(id)),
            _ => Err(ApiError::InvalidIdParam(raw)),
        }
    }
}

/// Rejects with an edit conflict when the request carries an expected
/// version that differs from `current`.
pub fn check_expected_version(headers: &HeaderMap, current: i32) -> Result<(), ApiError> {
    match headers.get(EXPECTED_VERSION_HEADER) {
        Some(expected) if expected.as_bytes() != current.to_string().as_bytes() => {
            Err(ApiError::EditConflict)
        }
        _ => Ok(()),
    }
}
