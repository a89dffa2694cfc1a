mod category;
mod product;

pub use self::category::CategoryRepository;
pub use self::product::ProductRepository;

use std::future::Future;
use std::time::Duration;

use sea_query::{Alias, Expr, Iden, Order, SelectStatement};

use crate::domain::{Filters, SortDirection, SortField};
use crate::utils::AppError;

/// Alias of the window-function column carrying the unpaginated row count.
pub(crate) const TOTAL_RECORDS: &str = "total_records";

/// Runs a database operation under `deadline`. On expiry the in-flight
/// future is dropped, which cancels the query.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| AppError::Timeout(deadline))?
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// Table columns the list filters refer to.
pub(crate) struct ListColumns<C> {
    pub id: C,
    pub name: C,
    pub created_at: C,
}

impl<C: Copy> ListColumns<C> {
    fn sort_column(&self, field: SortField) -> C {
        match field {
            SortField::Id => self.id,
            SortField::Name => self.name,
            SortField::CreatedAt => self.created_at,
        }
    }
}

/// Adds the total-count window, WHERE predicates, ORDER BY and
/// LIMIT/OFFSET for `filters` to a select over a single table.
pub(crate) fn apply_list_filters<C>(
    select: &mut SelectStatement,
    filters: &Filters,
    columns: ListColumns<C>,
) where
    C: Iden + Copy + 'static,
{
    select.expr_as(Expr::cust("count(*) OVER()"), Alias::new(TOTAL_RECORDS));

    if !filters.ids.is_empty() {
        select.and_where(Expr::col(columns.id).is_in(filters.ids.iter().copied()));
    }

    if !filters.name.is_empty() {
        select.and_where(Expr::cust_with_values(
            format!(
                "to_tsvector('simple', {name}) @@ plainto_tsquery('simple', ?)",
                name = columns.name.to_string()
            ),
            [filters.name.clone()],
        ));
    }

    if let Some(date_from) = filters.date_from {
        select.and_where(Expr::col(columns.created_at).gte(date_from));
    }

    if let Some(date_to) = filters.date_to {
        select.and_where(Expr::col(columns.created_at).lte(date_to));
    }

    for sort in filters.sort_columns() {
        let order = match sort.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        select.order_by(columns.sort_column(sort.field), order);
    }

    select.limit(filters.limit()).offset(filters.offset());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_expired_deadline_drops_operation() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());
        let deadline = Duration::from_millis(20);

        let result: Result<(), AppError> = with_deadline(deadline, async move {
            let _flag = flag;
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Timeout(d)) if d == deadline));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_operation_within_deadline() {
        let result = with_deadline(Duration::from_secs(5), async { Ok(7) }).await;
        assert!(matches!(result, Ok(7)));

        let result: Result<i32, AppError> =
            with_deadline(Duration::from_secs(5), async { Err(AppError::NotFound) }).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
