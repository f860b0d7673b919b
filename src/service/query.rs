//! List query parameters: `query` (JSON filter object), `sort`, `skip`, `limit`, `fields`.

use crate::config::{ResolvedEntity, ID_COLUMN};
use crate::error::AppError;
use crate::sql::{Filter, PgBindValue, SortSpec};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 2000;

#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sort: Option<SortSpec>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filters: Vec::new(),
            sort: None,
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Parse raw query-string parameters. Unknown filter and sort fields are dropped, not rejected.
    /// `fields` is accepted and ignored.
    pub fn from_params(entity: &ResolvedEntity, params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut q = ListQuery::default();
        if let Some(raw) = params.get("query").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let parsed: Value = serde_json::from_str(raw)
                .map_err(|_| AppError::BadRequest("invalid query JSON format".into()))?;
            let Value::Object(map) = parsed else {
                return Err(AppError::BadRequest("query must be a JSON object".into()));
            };
            q.filters = filters_from_map(entity, &map)?;
        }
        if let Some(raw) = params.get("sort") {
            q.sort = parse_sort(entity, raw);
        }
        if let Some(raw) = params.get("skip") {
            q.skip = parse_skip(raw)?;
        }
        if let Some(raw) = params.get("limit") {
            q.limit = parse_limit(raw)?;
        }
        Ok(q)
    }
}

/// Exact-match filters for known fields; values coerced to the field type.
pub fn filters_from_map(entity: &ResolvedEntity, map: &serde_json::Map<String, Value>) -> Result<Vec<Filter>, AppError> {
    let mut filters = Vec::new();
    for (field, value) in map {
        if !entity.has_column(field) {
            tracing::debug!(entity = %entity.path_segment, field = %field, "ignoring unknown filter field");
            continue;
        }
        filters.push(Filter {
            column: field.clone(),
            value: field_value(entity, field, value)?,
        });
    }
    Ok(filters)
}

/// Coerce `value` for `field`, which must be `id` or a declared column.
pub fn field_value(entity: &ResolvedEntity, field: &str, value: &Value) -> Result<PgBindValue, AppError> {
    if field == ID_COLUMN {
        return match value {
            Value::Null => Some(PgBindValue::Null),
            Value::Number(n) => n.as_i64().map(PgBindValue::I64),
            Value::String(s) => s.trim().parse().ok().map(PgBindValue::I64),
            _ => None,
        }
        .ok_or_else(|| AppError::Validation("id must be an integer".into()));
    }
    let column = entity
        .column(field)
        .ok_or_else(|| AppError::Validation(format!("field {} does not exist on {}", field, entity.path_segment)))?;
    PgBindValue::coerce(column, value)
}

/// `name` ascending, `-name` descending; unknown or empty yields `None` (newest first).
pub fn parse_sort(entity: &ResolvedEntity, raw: &str) -> Option<SortSpec> {
    let raw = raw.trim();
    let (column, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    if column.is_empty() || !entity.has_column(column) {
        return None;
    }
    Some(SortSpec {
        column: column.to_string(),
        descending,
    })
}

pub fn parse_skip(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::Validation("skip must be a non-negative integer".into())),
    }
}

pub fn parse_limit(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        _ => Err(AppError::Validation(format!("limit must be between 1 and {}", MAX_LIMIT))),
    }
}
