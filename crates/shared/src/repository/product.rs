use async_trait::async_trait;
use sea_query::{Expr, PostgresQueryBuilder, Query, SelectStatement, UpdateStatement};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, Row};
use std::time::Duration;
use tracing::{error, info};

use super::{
    ListColumns, TOTAL_RECORDS, apply_list_filters, is_foreign_key_violation, with_deadline,
};
use crate::abstract_trait::ProductRepositoryTrait;
use crate::config::ConnectionPool;
use crate::domain::{CreateProductRequest, Filters, Metadata};
use crate::model::product::Product;
use crate::schema::product::Products;
use crate::utils::AppError;

const PRODUCT_COLUMNS: [Products; 8] = [
    Products::Id,
    Products::Name,
    Products::CategoryId,
    Products::Description,
    Products::Price,
    Products::Quantity,
    Products::Version,
    Products::CreatedAt,
];

pub struct ProductRepository {
    db_pool: ConnectionPool,
    query_timeout: Duration,
}

impl ProductRepository {
    pub fn new(db_pool: ConnectionPool, query_timeout: Duration) -> Self {
        Self {
            db_pool,
            query_timeout,
        }
    }
}

fn list_query(filters: &Filters) -> SelectStatement {
    let mut select_query = Query::select();
    select_query.columns(PRODUCT_COLUMNS).from(Products::Table);

    apply_list_filters(
        &mut select_query,
        filters,
        ListColumns {
            id: Products::Id,
            name: Products::Name,
            created_at: Products::CreatedAt,
        },
    );

    select_query
}

/// Compare-and-swap update guarded by `product.version`.
fn update_query(product: &Product) -> UpdateStatement {
    let mut update_query = Query::update();
    update_query
        .table(Products::Table)
        .values([
            (Products::Name, product.name.clone().into()),
            (Products::CategoryId, product.category_id.into()),
            (Products::Description, product.description.clone().into()),
            (Products::Price, product.price.into()),
            (Products::Quantity, product.quantity.into()),
            (Products::Version, Expr::col(Products::Version).add(1)),
        ])
        .and_where(Expr::col(Products::Id).eq(product.id))
        .and_where(Expr::col(Products::Version).eq(product.version))
        .returning_all();

    update_query
}

/// Maps a write failure, turning a foreign key violation into a missing
/// category error for `category_id`.
fn map_write_error(err: sqlx::Error, category_id: i64) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::InvalidCategoryId(category_id)
    } else {
        AppError::from(err)
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn insert(&self, input: &CreateProductRequest) -> Result<Product, AppError> {
        info!(
            "Creating new product: {:?} in category {}",
            input.name, input.category_id
        );

        let (sql, values) = Query::insert()
            .into_table(Products::Table)
            .columns([
                Products::Name,
                Products::CategoryId,
                Products::Description,
                Products::Price,
                Products::Quantity,
            ])
            .values([
                input.name.clone().into(),
                input.category_id.into(),
                input.description.clone().into(),
                input.price.into(),
                input.quantity.into(),
            ])?
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let product = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Product, _>(&sql, values)
                .fetch_one(&self.db_pool)
                .await
                .map_err(|err| map_write_error(err, input.category_id))
        })
        .await
        .inspect_err(|e| error!("Error inserting product: {e}"))?;

        info!("New product inserted with ID: {}", product.id);

        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> Result<Product, AppError> {
        info!("Finding product by id: {id}");

        let (sql, values) = Query::select()
            .columns(PRODUCT_COLUMNS)
            .from(Products::Table)
            .and_where(Expr::col(Products::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Product, _>(&sql, values)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await?;

        result.ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Product>, Metadata), AppError> {
        info!(
            "Getting all products - page: {}, page_size: {}, name: {:?}, order: {}",
            filters.page,
            filters.page_size,
            filters.name,
            filters.order_by_clause()
        );

        let (sql, values) = list_query(filters).build_sqlx(PostgresQueryBuilder);

        let rows = with_deadline(self.query_timeout, async {
            sqlx::query_with(&sql, values)
                .fetch_all(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await
        .inspect_err(|e| error!("Error fetching products: {e}"))?;

        let mut total_records = 0;
        let mut products = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get::<i64, _>(TOTAL_RECORDS)?;
            products.push(Product::from_row(row)?);
        }

        info!("Found {} products out of total {total_records}", products.len());

        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);
        Ok((products, metadata))
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        info!(
            "Updating product ID {} at version {}",
            product.id, product.version
        );

        let (sql, values) = update_query(product).build_sqlx(PostgresQueryBuilder);

        let updated = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Product, _>(&sql, values)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(|err| map_write_error(err, product.category_id))
        })
        .await?;

        match updated {
            Some(updated) => {
                info!(
                    "Successfully updated product ID {} to version {}",
                    updated.id, updated.version
                );
                Ok(updated)
            }
            None => {
                error!(
                    "Edit conflict on product ID {} at version {}",
                    product.id, product.version
                );
                Err(AppError::EditConflict)
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        info!("Deleting product with ID: {id}");

        let (sql, values) = Query::delete()
            .from_table(Products::Table)
            .and_where(Expr::col(Products::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = with_deadline(self.query_timeout, async {
            sqlx::query_with(&sql, values)
                .execute(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await?;

        if result.rows_affected() == 0 {
            error!("No product found to delete with ID: {id}");
            return Err(AppError::NotFound);
        }

        info!("Product ID: {id} deleted successfully");
        Ok(())
    }
}
