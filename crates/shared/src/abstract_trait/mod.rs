mod category;
mod product;

pub use self::category::{CategoryRepositoryTrait, DynCategoryRepository};
pub use self::product::{DynProductRepository, ProductRepositoryTrait};
