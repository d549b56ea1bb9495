//! API models for request and response payloads

use serde::{Deserialize, Serialize};

use crate::query::Pagination;

pub mod complaint;
pub mod directory;
pub mod machine;
pub mod maintenance;

/// One page of a list response
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}

/// Directory entry referenced from a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// User account referenced from a record, shown by display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReference {
    pub id: i64,
    pub name: String,
}

/// Trim `value` and reject it when nothing is left
pub(crate) fn required(value: &str, field: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(value.to_string())
    }
}
