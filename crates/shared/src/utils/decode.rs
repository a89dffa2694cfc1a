//! Strict JSON body decoding.
//!
//! Request bodies are decoded into their destination type with unknown keys
//! rejected, a hard size cap, and a single top-level value. Every failure is
//! classified into a [`DecodeError`] whose `Display` text is safe to return
//! to the client verbatim.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Value, error::Category};
use thiserror::Error;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("{}", malformed_message(*.offset))]
    MalformedJson { offset: Option<usize> },

    #[error("{}", type_mismatch_message(.field.as_deref(), *.offset))]
    TypeMismatch {
        field: Option<String>,
        offset: usize,
    },

    #[error("body contains unknown key \"{0}\"")]
    UnknownField(String),

    #[error("body must only contain a single JSON value")]
    TrailingData,
}

fn malformed_message(offset: Option<usize>) -> String {
    match offset {
        Some(offset) => format!("body contains badly-formed JSON (at character {offset})"),
        None => "body contains badly-formed JSON".to_string(),
    }
}

fn type_mismatch_message(field: Option<&str>, offset: usize) -> String {
    match field {
        Some(field) => format!("body contains incorrect JSON type for field \"{field}\""),
        None => format!("body contains incorrect JSON type (at character {offset})"),
    }
}

/// Decodes `body` into `T`.
///
/// Checks run in a fixed order: size, emptiness, syntax, types, unknown
/// keys, then trailing content after the first JSON value. `T` should be
/// annotated with `#[serde(deny_unknown_fields)]` for unknown keys to be
/// reported, and with `#[serde(default)]` so missing keys are left to
/// field validation.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(DecodeError::BodyTooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::EmptyBody);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let value: T = match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(value) => value,
        Err(err) if is_duplicate_field(err.inner()) => return decode_last_key_wins(body),
        Err(err) => return Err(classify(body, err)),
    };

    deserializer.end().map_err(|_| DecodeError::TrailingData)?;

    Ok(value)
}

/// Decodes through an intermediate `Value`, whose objects keep the last
/// occurrence of a repeated key.
fn decode_last_key_wins<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let value: Value =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| classify(body, err))?;

    deserializer.end().map_err(|_| DecodeError::TrailingData)?;

    serde_path_to_error::deserialize(value).map_err(|err| classify(body, err))
}

fn is_duplicate_field(err: &serde_json::Error) -> bool {
    err.classify() == Category::Data && err.to_string().starts_with("duplicate field `")
}

fn classify(body: &[u8], err: serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    let offset = byte_offset(body, inner.line(), inner.column());
    let field = (path != "." && !path.is_empty()).then_some(path);

    match inner.classify() {
        Category::Eof | Category::Io => DecodeError::MalformedJson { offset: None },
        // A well-formed number that does not fit the target is a type error.
        Category::Syntax if inner.to_string().starts_with("number out of range") => {
            DecodeError::TypeMismatch { field, offset }
        }
        Category::Syntax => DecodeError::MalformedJson {
            offset: Some(offset),
        },
        Category::Data => match unknown_field_name(&inner.to_string()) {
            Some(name) => DecodeError::UnknownField(name),
            None => DecodeError::TypeMismatch { field, offset },
        },
    }
}

/// Deserializes a JSON `null` as the type's default, leaving the decision
/// about missing values to field validation.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// serde reports unknown keys as "unknown field `name`, expected ...".
fn unknown_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

// serde_json positions are 1-based lines and byte columns within the line.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = body
        .split(|byte| *byte == b'\n')
        .take(line.saturating_sub(1))
        .map(|line| line.len() + 1)
        .sum();

    preceding + column
}
