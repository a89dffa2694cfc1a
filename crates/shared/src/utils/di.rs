use std::sync::Arc;
use std::time::Duration;

use crate::{
    abstract_trait::{DynCategoryRepository, DynProductRepository},
    config::ConnectionPool,
    repository::{CategoryRepository, ProductRepository},
};

#[derive(Clone)]
pub struct DependenciesInject {
    pub category_repository: DynCategoryRepository,
    pub product_repository: DynProductRepository,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("category_repository", &"DynCategoryRepository")
            .field("product_repository", &"DynProductRepository")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(pool: ConnectionPool, query_timeout: Duration) -> Self {
        let category_repository = Arc::new(CategoryRepository::new(pool.clone(), query_timeout))
            as DynCategoryRepository;
        let product_repository =
            Arc::new(ProductRepository::new(pool, query_timeout)) as DynProductRepository;

        Self::from_repositories(category_repository, product_repository)
    }

    pub fn from_repositories(
        category_repository: DynCategoryRepository,
        product_repository: DynProductRepository,
    ) -> Self {
        Self {
            category_repository,
            product_repository,
        }
    }
}
