#![allow(dead_code)]

use std::cmp::Ordering;
use std::io;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use products_server::handler::AppRouter;
use serde_json::Value;
use shared::{
    abstract_trait::{
        CategoryRepositoryTrait, DynCategoryRepository, DynProductRepository,
        ProductRepositoryTrait,
    },
    domain::{
        CreateCategoryRequest, CreateProductRequest, Filters, Metadata, SortDirection,
        SortField,
    },
    model::{category::Category, product::Product},
    state::AppState,
    utils::AppError,
};
use tokio::sync::Mutex;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Default)]
pub struct Store {
    categories: Mutex<Vec<Category>>,
    products: Mutex<Vec<Product>>,
    next_id: Mutex<i64>,
}

impl Store {
    async fn next_id(&self) -> i64 {
        let mut next = self.next_id.lock().await;
        *next += 1;
        *next
    }
}

/// Row fields the shared list logic needs.
trait Listed: Clone {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Listed for Category {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Listed for Product {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn list<T: Listed>(rows: &[T], filters: &Filters) -> (Vec<T>, Metadata) {
    let words: Vec<String> = filters
        .name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| filters.ids.is_empty() || filters.ids.contains(&row.id()))
        .filter(|row| {
            let name = row.name().to_lowercase();
            words.iter().all(|word| name.contains(word.as_str()))
        })
        .filter(|row| filters.date_from.is_none_or(|from| row.created_at() >= from))
        .filter(|row| filters.date_to.is_none_or(|to| row.created_at() <= to))
        .cloned()
        .collect();

    let columns = filters.sort_columns();
    matched.sort_by(|a, b| {
        columns.iter().fold(Ordering::Equal, |ordering, column| {
            ordering.then_with(|| {
                let natural = match column.field {
                    SortField::Id => a.id().cmp(&b.id()),
                    SortField::Name => a.name().cmp(b.name()),
                    SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
                };
                match column.direction {
                    SortDirection::Asc => natural,
                    SortDirection::Desc => natural.reverse(),
                }
            })
        })
    });

    let total = matched.len() as i64;
    let page: Vec<T> = matched
        .into_iter()
        .skip(filters.offset() as usize)
        .take(filters.limit() as usize)
        .collect();

    (page, Metadata::calculate(total, filters.page, filters.page_size))
}

pub struct InMemoryCategories(Arc<Store>);

#[async_trait]
impl CategoryRepositoryTrait for InMemoryCategories {
    async fn insert(&self, input: &CreateCategoryRequest) -> Result<Category, AppError> {
        let category = Category {
            id: self.0.next_id().await,
            name: input.name.clone(),
            description: input.description.clone(),
            version: 1,
            created_at: Utc::now(),
        };
        self.0.categories.lock().await.push(category.clone());
        Ok(category)
    }

    async fn get_by_id(&self, id: i64) -> Result<Category, AppError> {
        let categories = self.0.categories.lock().await;
        categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Category>, Metadata), AppError> {
        Ok(list(&self.0.categories.lock().await, filters))
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        let mut categories = self.0.categories.lock().await;
        let stored = categories
            .iter_mut()
            .find(|c| c.id == category.id && c.version == category.version)
            .ok_or(AppError::EditConflict)?;

        *stored = Category {
            version: category.version + 1,
            created_at: stored.created_at,
            ..category.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.0.products.lock().await.iter().any(|p| p.category_id == id) {
            return Err(AppError::CategoryInUse(id));
        }

        let mut categories = self.0.categories.lock().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

pub struct InMemoryProducts(Arc<Store>);

impl InMemoryProducts {
    async fn check_category(&self, category_id: i64) -> Result<(), AppError> {
        let categories = self.0.categories.lock().await;
        if categories.iter().any(|c| c.id == category_id) {
            Ok(())
        } else {
            Err(AppError::InvalidCategoryId(category_id))
        }
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryProducts {
    async fn insert(&self, input: &CreateProductRequest) -> Result<Product, AppError> {
        self.check_category(input.category_id).await?;

        let product = Product {
            id: self.0.next_id().await,
            name: input.name.clone(),
            category_id: input.category_id,
            description: input.description.clone(),
            price: input.price,
            quantity: input.quantity,
            version: 1,
            created_at: Utc::now(),
        };
        self.0.products.lock().await.push(product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> Result<Product, AppError> {
        let products = self.0.products.lock().await;
        products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: &Filters) -> Result<(Vec<Product>, Metadata), AppError> {
        Ok(list(&self.0.products.lock().await, filters))
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        self.check_category(product.category_id).await?;

        let mut products = self.0.products.lock().await;
        let stored = products
            .iter_mut()
            .find(|p| p.id == product.id && p.version == product.version)
            .ok_or(AppError::EditConflict)?;

        *stored = Product {
            version: product.version + 1,
            created_at: stored.created_at,
            ..product.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut products = self.0.products.lock().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Repository whose every call fails the way an expired query deadline does.
pub struct TimedOut;

fn timed_out() -> AppError {
    AppError::Timeout(Duration::from_secs(5))
}

#[async_trait]
impl CategoryRepositoryTrait for TimedOut {
    async fn insert(&self, _: &CreateCategoryRequest) -> Result<Category, AppError> {
        Err(timed_out())
    }
    async fn get_by_id(&self, _: i64) -> Result<Category, AppError> {
        Err(timed_out())
    }
    async fn get_all(&self, _: &Filters) -> Result<(Vec<Category>, Metadata), AppError> {
        Err(timed_out())
    }
    async fn update(&self, _: &Category) -> Result<Category, AppError> {
        Err(timed_out())
    }
    async fn delete(&self, _: i64) -> Result<(), AppError> {
        Err(timed_out())
    }
}

#[async_trait]
impl ProductRepositoryTrait for TimedOut {
    async fn insert(&self, _: &CreateProductRequest) -> Result<Product, AppError> {
        Err(timed_out())
    }
    async fn get_by_id(&self, _: i64) -> Result<Product, AppError> {
        Err(timed_out())
    }
    async fn get_all(&self, _: &Filters) -> Result<(Vec<Product>, Metadata), AppError> {
        Err(timed_out())
    }
    async fn update(&self, _: &Product) -> Result<Product, AppError> {
        Err(timed_out())
    }
    async fn delete(&self, _: i64) -> Result<(), AppError> {
        Err(timed_out())
    }
}

pub fn app() -> Router {
    let store = Arc::new(Store::default());
    let categories = Arc::new(InMemoryCategories(store.clone())) as DynCategoryRepository;
    let products = Arc::new(InMemoryProducts(store)) as DynProductRepository;

    AppRouter::build(AppState::with_repositories(categories, products))
}

pub fn failing_app() -> Router {
    AppRouter::build(AppState::with_repositories(
        Arc::new(TimedOut) as DynCategoryRepository,
        Arc::new(TimedOut) as DynProductRepository,
    ))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let raw = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    let body = if raw.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&raw).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        raw,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, "GET", uri, None, &[]).await
}

pub async fn post(app: &Router, uri: &str, body: &str) -> TestResponse {
    send(app, "POST", uri, Some(body), &[]).await
}

/// Captures JSON log lines written while it is the default subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<StdMutex<Vec<u8>>>);

impl LogBuffer {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn entries(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// The entry logged for an error response to `uri`.
    pub fn error_entry(&self, uri: &str) -> Option<Value> {
        self.entries()
            .into_iter()
            .find(|entry| entry["fields"]["uri"] == uri)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
