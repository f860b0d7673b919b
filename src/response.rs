//! Response bodies shared by the entity handlers.

use serde::Serialize;
use serde_json::Value;

/// One page of a list query. `total` counts every matching row, not just this page.
#[derive(Debug, Serialize)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
    pub id: i64,
}

impl Deleted {
    pub fn new(entity: &str, id: i64) -> Self {
        Deleted {
            message: format!("{} {} deleted successfully", entity, id),
            id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchDeleted {
    pub message: String,
    pub deleted_count: u64,
}

impl BatchDeleted {
    pub fn new(entity: &str, deleted_count: u64) -> Self {
        BatchDeleted {
            message: format!("Successfully deleted {} {}", deleted_count, entity),
            deleted_count,
        }
    }
}

pub fn error_body(code: &str, message: String) -> Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}
