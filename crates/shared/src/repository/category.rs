use async_trait::async_trait;
use sea_query::{Expr, PostgresQueryBuilder, Query, SelectStatement, UpdateStatement};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, Row};
use std::time::Duration;
use tracing::{error, info};

use super::{
    ListColumns, TOTAL_RECORDS, apply_list_filters, is_foreign_key_violation, with_deadline,
};
use crate::abstract_trait::CategoryRepositoryTrait;
use crate::config::ConnectionPool;
use crate::domain::{CreateCategoryRequest, Filters, Metadata};
use crate::model::category::Category;
use crate::schema::category::Categories;
use crate::utils::AppError;

pub struct CategoryRepository {
    db_pool: ConnectionPool,
    query_timeout: Duration,
}

impl CategoryRepository {
    pub fn new(db_pool: ConnectionPool, query_timeout: Duration) -> Self {
        Self {
            db_pool,
            query_timeout,
        }
    }
}

fn list_query(filters: &Filters) -> SelectStatement {
    let mut select_query = Query::select();
    select_query
        .columns([
            Categories::Id,
            Categories::Name,
            Categories::Description,
            Categories::Version,
            Categories::CreatedAt,
        ])
        .from(Categories::Table);

    apply_list_filters(
        &mut select_query,
        filters,
        ListColumns {
            id: Categories::Id,
            name: Categories::Name,
            created_at: Categories::CreatedAt,
        },
    );

    select_query
}

/// Compare-and-swap update: matches only while the stored version equals
/// `category.version` and bumps it by one.
fn update_query(category: &Category) -> UpdateStatement {
    let mut update_query = Query::update();
    update_query
        .table(Categories::Table)
        .values([
            (Categories::Name, category.name.clone().into()),
            (Categories::Description, category.description.clone().into()),
            (Categories::Version, Expr::col(Categories::Version).add(1)),
        ])
        .and_where(Expr::col(Categories::Id).eq(category.id))
        .and_where(Expr::col(Categories::Version).eq(category.version))
        .returning_all();

    update_query
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn insert(&self, input: &CreateCategoryRequest) -> Result<Category, AppError> {
        info!("Creating new category: {:?}", input.name);

        let (sql, values) = Query::insert()
            .into_table(Categories::Table)
            .columns([Categories::Name, Categories::Description])
            .values([input.name.clone().into(), input.description.clone().into()])?
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let category = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Category, _>(&sql, values)
                .fetch_one(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await
        .inspect_err(|e| error!("Error inserting category: {e}"))?;

        info!("New category inserted with ID: {}", category.id);

        Ok(category)
    }

    async fn get_by_id(&self, id: i64) -> Result<Category, AppError> {
        info!("Finding category by id: {id}");

        let (sql, values) = Query::select()
            .columns([
                Categories::Id,
                Categories::Name,
                Categories::Description,
                Categories::Version,
                Categories::CreatedAt,
            ])
            .from(Categories::Table)
            .and_where(Expr::col(Categories::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Category, _>(&sql, values)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await?;

        result.ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Category>, Metadata), AppError> {
        info!(
            "Getting all categories - page: {}, page_size: {}, name: {:?}, order: {}",
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
        .inspect_err(|e| error!("Error fetching categories: {e}"))?;

        let mut total_records = 0;
        let mut categories = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get::<i64, _>(TOTAL_RECORDS)?;
            categories.push(Category::from_row(row)?);
        }

        info!("Found {} categories out of total {total_records}", categories.len());

        let metadata = Metadata::calculate(total_records, filters.page, filters.page_size);
        Ok((categories, metadata))
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        info!(
            "Updating category ID {} at version {}",
            category.id, category.version
        );

        let (sql, values) = update_query(category).build_sqlx(PostgresQueryBuilder);

        let updated = with_deadline(self.query_timeout, async {
            sqlx::query_as_with::<_, Category, _>(&sql, values)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(AppError::from)
        })
        .await?;

        match updated {
            Some(updated) => {
                info!(
                    "Successfully updated category ID {} to version {}",
                    updated.id, updated.version
                );
                Ok(updated)
            }
            None => {
                error!(
                    "Edit conflict on category ID {} at version {}",
                    category.id, category.version
                );
                Err(AppError::EditConflict)
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        info!("Deleting category with ID: {id}");

        let (sql, values) = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = with_deadline(self.query_timeout, async {
            sqlx::query_with(&sql, values)
                .execute(&self.db_pool)
                .await
                .map_err(|err| {
                    if is_foreign_key_violation(&err) {
                        AppError::CategoryInUse(id)
                    } else {
                        AppError::from(err)
                    }
                })
        })
        .await?;

        match result.rows_affected() {
            0 => {
                error!("No category found to delete with ID: {id}");
                Err(AppError::NotFound)
            }
            _ => {
                info!("Category ID: {id} deleted successfully");
                Ok(())
            }
        }
    }
}
