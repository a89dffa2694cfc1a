//! List filters parsed from the query string.
//!
//! Parsing happens in two passes. [`Filters::from_query`] converts raw
//! strings and reports malformed tokens; the `Validate` impl then checks
//! bounds and the sort safelist on the typed values.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

use crate::utils::{FieldErrors, MAX_ITEMS, ONE_OF};

/// Sort keys accepted in `?sort=`.
pub const SORT_SAFELIST: [&str; 6] = ["id", "created_at", "name", "-id", "-created_at", "-name"];
pub const MAX_SORT_KEYS: usize = 4;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    CreatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortColumn {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortColumn {
    pub const ID_ASC: SortColumn = SortColumn {
        field: SortField::Id,
        direction: SortDirection::Asc,
    };

    /// Resolves a safelisted sort key; a leading `-` means descending.
    pub fn parse(key: &str) -> Option<Self> {
        let (name, direction) = match key.strip_prefix('-') {
            Some(name) => (name, SortDirection::Desc),
            None => (key, SortDirection::Asc),
        };

        let field = match name {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "created_at" => SortField::CreatedAt,
            _ => return None,
        };

        Some(Self { field, direction })
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        write!(f, "{} {direction}", self.field.column())
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Filters {
    pub ids: Vec<i64>,

    #[validate(length(max = 100))]
    pub name: String,

    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_sort_keys"))]
    pub sort: Vec<String>,

    #[validate(range(min = 1, max = 10_000_000))]
    pub page: i64,

    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            name: String::new(),
            date_from: None,
            date_to: None,
            sort: Vec::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Filters {
    /// Builds filters from decoded query parameters. Empty values fall back
    /// to defaults; malformed values are collected per field.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let defaults = Filters::default();

        let ids = read_ids(query, "id", &mut errors);
        let date_from = read_datetime(query, "date_from", &mut errors);
        let date_to = read_datetime(query, "date_to", &mut errors);
        let page = read_int(query, "page", defaults.page, &mut errors);
        let page_size = read_int(query, "page_size", defaults.page_size, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            ids,
            name: query.get("name").cloned().unwrap_or_default(),
            date_from,
            date_to,
            sort: read_csv(query, "sort"),
            page,
            page_size,
        })
    }

    /// Requested sort columns in request order, with `id ASC` appended
    /// unless the request already orders by id.
    pub fn sort_columns(&self) -> Vec<SortColumn> {
        let mut columns: Vec<SortColumn> = self
            .sort
            .iter()
            .filter_map(|key| SortColumn::parse(key))
            .collect();

        if !columns.iter().any(|column| column.field == SortField::Id) {
            columns.push(SortColumn::ID_ASC);
        }

        columns
    }

    pub fn order_by_clause(&self) -> String {
        self.sort_columns()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn limit(&self) -> u64 {
        self.page_size.max(0) as u64
    }

    pub fn offset(&self) -> u64 {
        ((self.page - 1).max(0) * self.page_size.max(0)) as u64
    }
}

fn read_value<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn read_csv(query: &HashMap<String, String>, key: &str) -> Vec<String> {
    read_value(query, key)
        .map(|value| value.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn read_ids(query: &HashMap<String, String>, key: &str, errors: &mut FieldErrors) -> Vec<i64> {
    let Some(raw) = read_value(query, key) else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    for token in raw.split(',') {
        match token.trim().parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                errors.add(key, format!("invalid id: {token:?}"));
                return Vec::new();
            }
        }
    }
    ids
}

fn read_datetime(
    query: &HashMap<String, String>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<DateTime<Utc>> {
    let raw = read_value(query, key)?;

    match DateTime::parse_from_rfc3339(raw) {
        Ok(datetime) => Some(datetime.with_timezone(&Utc)),
        Err(_) => {
            errors.add(key, format!("invalid datetime: {raw}"));
            None
        }
    }
}

fn read_int(
    query: &HashMap<String, String>,
    key: &str,
    default: i64,
    errors: &mut FieldErrors,
) -> i64 {
    let Some(raw) = read_value(query, key) else {
        return default;
    };

    raw.parse().unwrap_or_else(|_| {
        errors.add(key, format!("must be an integer value: {raw}"));
        default
    })
}

fn validate_sort_keys(keys: &[String]) -> Result<(), ValidationError> {
    if keys.len() > MAX_SORT_KEYS {
        let mut error = ValidationError::new(MAX_ITEMS);
        error.add_param("max".into(), &MAX_SORT_KEYS);
        return Err(error);
    }

    if keys.iter().any(|key| !SORT_SAFELIST.contains(&key.as_str())) {
        let mut error = ValidationError::new(ONE_OF);
        error.add_param("allowed".into(), &SORT_SAFELIST);
        return Err(error);
    }

    Ok(())
}
