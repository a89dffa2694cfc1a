use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    abstract_trait::{DynCategoryRepository, DynProductRepository},
    config::ConnectionPool,
    utils::{DependenciesInject, Metrics},
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub di_container: DependenciesInject,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(pool: ConnectionPool, query_timeout: Duration) -> Self {
        Self::with_container(DependenciesInject::new(pool, query_timeout))
    }

    /// Builds the state around caller-supplied repositories.
    pub fn with_repositories(
        category_repository: DynCategoryRepository,
        product_repository: DynProductRepository,
    ) -> Self {
        Self::with_container(DependenciesInject::from_repositories(
            category_repository,
            product_repository,
        ))
    }

    fn with_container(di_container: DependenciesInject) -> Self {
        let mut registry = Registry::default();

        let metrics = Metrics::new();
        metrics.register(&mut registry);

        Self {
            registry: Arc::new(registry),
            di_container,
            metrics,
        }
    }
}
