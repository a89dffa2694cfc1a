//! Field-level validation messages.
//!
//! Rules are declared on request types with `validator` attributes. This
//! module turns the failures into client-facing messages keyed by the wire
//! field name, one message per field.

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

/// Error code for a field that must be present and non-empty.
pub const REQUIRED: &str = "required";
/// Error code for a value outside a fixed set of choices.
pub const ONE_OF: &str = "oneof";
/// Error code for a list with too many entries.
pub const MAX_ITEMS: &str = "max_items";

/// Ordered field → message pairs. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Single-line rendering used for log entries: `field message; field message`.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, message)| format!("{field} {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut field_errors = FieldErrors::new();
        for (field, failures) in fields {
            let reported = failures
                .iter()
                .find(|failure| failure.code == REQUIRED)
                .or_else(|| failures.first());

            if let Some(failure) = reported {
                field_errors.add(field.to_string(), validation_message(failure));
            }
        }
        field_errors
    }
}

/// Translates one failed rule into its client-facing message.
pub fn validation_message(error: &ValidationError) -> String {
    match error.code.as_ref() {
        REQUIRED => "is required".to_string(),
        "length" => length_message(error),
        "range" => range_message(error),
        ONE_OF => match error.params.get("allowed") {
            Some(allowed) => format!("must be one of [{}]", plain(allowed)),
            None => "is not an allowed value".to_string(),
        },
        MAX_ITEMS => match error.params.get("max") {
            Some(max) => format!("must contain at most {} entries", plain(max)),
            None => "contains too many entries".to_string(),
        },
        _ => error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| "is invalid".to_string()),
    }
}

fn length_message(error: &ValidationError) -> String {
    let param = |name: &str| error.params.get(name);
    let length = param("value").and_then(|value| value.as_str()).map(|value| value.chars().count());

    if let Some(equal) = param("equal") {
        return format!("must be exactly {} characters long", plain(equal));
    }

    match (param("min"), param("max")) {
        (Some(min), Some(max)) => {
            let below_min = match (length, min.as_u64()) {
                (Some(length), Some(min)) => (length as u64) < min,
                _ => false,
            };
            if below_min {
                format!("must be at least {} characters long", plain(min))
            } else {
                format!("must be at most {} characters long", plain(max))
            }
        }
        (Some(min), None) => format!("must be at least {} characters long", plain(min)),
        (None, Some(max)) => format!("must be at most {} characters long", plain(max)),
        (None, None) => "has an invalid length".to_string(),
    }
}

fn range_message(error: &ValidationError) -> String {
    let param = |name: &str| error.params.get(name);
    let value = param("value").and_then(Value::as_f64);

    match (param("min"), param("max")) {
        (Some(min), Some(max)) => {
            let below_min = match (value, min.as_f64()) {
                (Some(value), Some(min)) => value < min,
                _ => false,
            };
            if below_min {
                format!("must be greater than or equal to {}", plain(min))
            } else {
                format!("must be less than or equal to {}", plain(max))
            }
        }
        (Some(min), None) => format!("must be greater than or equal to {}", plain(min)),
        (None, Some(max)) => format!("must be less than or equal to {}", plain(max)),
        (None, None) => "is out of range".to_string(),
    }
}

// Renders a rule parameter without JSON quoting; whole floats drop their
// fractional part so `0.0` reads as `0`.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(int), _) => int.to_string(),
            (None, Some(float)) if float.fract() == 0.0 => format!("{float:.0}"),
            _ => number.to_string(),
        },
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// Custom rule for text fields that must be non-empty.
pub fn required_text(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Default, Deserialize, Validate)]
    struct Payload {
        #[validate(custom(function = "required_text"), length(min = 3, max = 100))]
        name: String,

        #[validate(range(min = 1, code = "required"))]
        category_id: i64,

        #[validate(range(min = 0.0))]
        price: f64,

        #[validate(range(min = 1, max = 100))]
        page_size: i64,
    }

    fn valid() -> Payload {
        Payload {
            name: "Coffee".into(),
            category_id: 1,
            price: 1.5,
            page_size: 20,
        }
    }

    fn errors_for(payload: &Payload) -> FieldErrors {
        FieldErrors::from(&payload.validate().unwrap_err())
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_required_wins_over_length() {
        let payload = Payload {
            name: String::new(),
            ..valid()
        };

        assert_eq!(errors_for(&payload).get("name"), Some("is required"));
    }

    #[test]
    fn test_length_messages() {
        let short = Payload {
            name: "ab".into(),
            ..valid()
        };
        assert_eq!(
            errors_for(&short).get("name"),
            Some("must be at least 3 characters long")
        );

        let long = Payload {
            name: "x".repeat(101),
            ..valid()
        };
        assert_eq!(
            errors_for(&long).get("name"),
            Some("must be at most 100 characters long")
        );
    }

    #[test]
    fn test_range_messages() {
        let payload = Payload {
            category_id: 0,
            price: -1.0,
            page_size: 101,
            ..valid()
        };
        let errors = errors_for(&payload);

        assert_eq!(errors.get("category_id"), Some("is required"));
        assert_eq!(errors.get("price"), Some("must be greater than or equal to 0"));
        assert_eq!(
            errors.get("page_size"),
            Some("must be less than or equal to 100")
        );

        let payload = Payload {
            page_size: 0,
            ..valid()
        };
        assert_eq!(
            errors_for(&payload).get("page_size"),
            Some("must be greater than or equal to 1")
        );
    }

    #[test]
    fn test_collects_every_failing_field() {
        let payload = Payload {
            name: String::new(),
            category_id: 0,
            price: -3.0,
            page_size: 0,
        };
        let errors = errors_for(&payload);

        assert_eq!(errors.len(), 4);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({
                "category_id": "is required",
                "name": "is required",
                "page_size": "must be greater than or equal to 1",
                "price": "must be greater than or equal to 0",
            })
        );
    }

    #[test]
    fn test_oneof_and_max_items_messages() {
        let mut error = ValidationError::new(ONE_OF);
        error.add_param("allowed".into(), &["id", "-id"]);
        assert_eq!(validation_message(&error), "must be one of [id -id]");

        let mut error = ValidationError::new(MAX_ITEMS);
        error.add_param("max".into(), &4);
        assert_eq!(validation_message(&error), "must contain at most 4 entries");
    }

    #[test]
    fn test_field_errors_keep_first_message_and_order() {
        let mut errors = FieldErrors::new();
        errors.add("page", "must be an integer value: as");
        errors.add("page_size", "must be an integer value: bk");
        errors.add("page", "ignored");

        assert_eq!(errors.get("page"), Some("must be an integer value: as"));
        assert_eq!(
            errors.summary(),
            "page must be an integer value: as; page_size must be an integer value: bk"
        );
    }
}
