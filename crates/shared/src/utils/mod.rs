mod decode;
mod di;
mod errors;
mod log;
mod metrics;
mod validation;

pub use self::decode::{DecodeError, MAX_BODY_BYTES, decode_json, null_as_default};
pub use self::di::DependenciesInject;
pub use self::errors::AppError;
pub use self::log::init_logger;
pub use self::metrics::{Method, MethodLabels, Metrics, Status};
pub use self::validation::{
    FieldErrors, MAX_ITEMS, ONE_OF, REQUIRED, required_text, validation_message,
};
