mod api;
mod category;
mod metadata;
mod product;

pub use self::api::MessageResponse;
pub use self::category::{CategoriesEnvelope, CategoryEnvelope, CategoryResponse};
pub use self::metadata::Metadata;
pub use self::product::{ProductEnvelope, ProductResponse, ProductsEnvelope};
