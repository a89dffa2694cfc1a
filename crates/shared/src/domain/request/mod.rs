mod category;
mod filters;
mod product;

pub use self::category::{CreateCategoryRequest, UpdateCategoryRequest};
pub use self::filters::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filters, MAX_SORT_KEYS, SORT_SAFELIST, SortColumn,
    SortDirection, SortField,
};
pub use self::product::{CreateProductRequest, UpdateProductRequest};
