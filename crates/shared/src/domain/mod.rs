mod request;
mod response;

pub use self::request::{
    CreateCategoryRequest, CreateProductRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filters,
    MAX_SORT_KEYS, SORT_SAFELIST, SortColumn, SortDirection, SortField, UpdateCategoryRequest,
    UpdateProductRequest,
};

pub use self::response::{
    CategoriesEnvelope, CategoryEnvelope, CategoryResponse, MessageResponse, Metadata,
    ProductEnvelope, ProductResponse, ProductsEnvelope,
};
