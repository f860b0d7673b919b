//! Entity access service: generic CRUD and batch operations against PostgreSQL.
//! Every single-item operation runs on the caller's unit of work; batches manage their own.

use crate::config::{BatchMode, ColumnInfo, FieldType, ResolvedEntity, ID_COLUMN};
use crate::error::AppError;
use crate::response::Page;
use crate::service::query::{field_value, ListQuery};
use crate::service::unit::settle;
use crate::service::validation::{Assignments, RequestValidator};
use crate::service::RowScope;
use crate::sql::{self, Filter, PgBindValue, QueryBuf};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

/// One entry of a batch update: the target id and the partial fields to apply.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchUpdateItem {
    pub id: i64,
    #[serde(default)]
    pub updates: Map<String, Value>,
}

pub struct CrudService;

impl CrudService {
    /// Insert one row. Under an owner scope the owner column is always the scope's owner.
    pub async fn create(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let values = Self::prepare_create(entity, scope, body)?;
        Self::insert_prepared(conn, entity, &values).await
    }

    /// Fetch one row by id. `None` when absent or owned by someone else.
    pub async fn get_by_id(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(entity, id, scope);
        Self::fetch_optional(conn, entity, &q).await
    }

    /// Page of rows plus the total count of matching rows.
    pub async fn get_list(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        query: &ListQuery,
    ) -> Result<Page, AppError> {
        let count_q = sql::count(entity, scope, &query.filters);
        tracing::debug!(sql = %count_q.sql, params = ?count_q.params, "query");
        let mut count = sqlx::query_scalar::<_, i64>(&count_q.sql);
        for p in &count_q.params {
            count = count.bind(p.clone());
        }
        let total = count.fetch_one(&mut *conn).await?;

        let q = sql::select_list(
            entity,
            scope,
            &query.filters,
            query.sort.as_ref(),
            query.skip,
            query.limit,
        );
        let items = Self::fetch_all(conn, entity, &q).await?;
        Ok(Page {
            items,
            total,
            skip: query.skip,
            limit: query.limit,
        })
    }

    /// Overwrite the supplied non-null fields. `None` when no matching row exists.
    pub async fn update(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let sets = RequestValidator::validate_partial(entity, body)?;
        Self::update_prepared(conn, entity, scope, id, &sets).await
    }

    /// Remove one row. `false` when no matching row exists.
    pub async fn delete(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        id: i64,
    ) -> Result<bool, AppError> {
        let q = sql::delete(entity, id, scope);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(&q).fetch_optional(&mut *conn).await?;
        let deleted = row.is_some();
        if deleted {
            tracing::info!(entity = %entity.path_segment, id, "deleted");
        } else {
            tracing::warn!(entity = %entity.path_segment, id, "not found for deletion");
        }
        Ok(deleted)
    }

    /// First row (newest first) where `field` equals `value`. Unknown fields are an error here.
    pub async fn get_by_field(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, AppError> {
        let mut rows = Self::list_by_field(conn, entity, scope, field, value, 0, 1).await?;
        Ok(rows.pop())
    }

    /// Rows where `field` equals `value`, newest first. Unknown fields are an error here.
    pub async fn list_by_field(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        field: &str,
        value: &Value,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Value>, AppError> {
        let filter = Filter {
            column: field.to_string(),
            value: field_value(entity, field, value)?,
        };
        let q = sql::select_list(entity, scope, std::slice::from_ref(&filter), None, skip, limit);
        Self::fetch_all(conn, entity, &q).await
    }

    /// Create every item in order. All items are validated before the first insert.
    pub async fn batch_create(
        pool: &PgPool,
        mode: BatchMode,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        items: &[Map<String, Value>],
    ) -> Result<Vec<Value>, AppError> {
        let prepared = items
            .iter()
            .map(|body| Self::prepare_create(entity, scope, body))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(prepared.len());
        match mode {
            BatchMode::PerItem => {
                for values in &prepared {
                    let mut tx = pool.begin().await?;
                    let result = Self::insert_prepared(&mut tx, entity, values).await;
                    out.push(settle(tx, result).await?);
                }
            }
            BatchMode::Atomic => {
                let mut tx = pool.begin().await?;
                let mut result = Ok(());
                for values in &prepared {
                    match Self::insert_prepared(&mut tx, entity, values).await {
                        Ok(row) => out.push(row),
                        Err(e) => {
                            result = Err(e);
                            break;
                        }
                    }
                }
                settle(tx, result).await?;
            }
        }
        tracing::info!(entity = %entity.path_segment, count = out.len(), "batch created");
        Ok(out)
    }

    /// Apply each partial update in order; returns only the rows that were found.
    pub async fn batch_update(
        pool: &PgPool,
        mode: BatchMode,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        items: &[BatchUpdateItem],
    ) -> Result<Vec<Value>, AppError> {
        let prepared = items
            .iter()
            .map(|item| Ok((item.id, RequestValidator::validate_partial(entity, &item.updates)?)))
            .collect::<Result<Vec<(i64, Assignments)>, AppError>>()?;

        let mut out = Vec::with_capacity(prepared.len());
        match mode {
            BatchMode::PerItem => {
                for (id, sets) in &prepared {
                    let mut tx = pool.begin().await?;
                    let result = Self::update_prepared(&mut tx, entity, scope, *id, sets).await;
                    if let Some(row) = settle(tx, result).await? {
                        out.push(row);
                    }
                }
            }
            BatchMode::Atomic => {
                let mut tx = pool.begin().await?;
                let mut result = Ok(());
                for (id, sets) in &prepared {
                    match Self::update_prepared(&mut tx, entity, scope, *id, sets).await {
                        Ok(Some(row)) => out.push(row),
                        Ok(None) => {}
                        Err(e) => {
                            result = Err(e);
                            break;
                        }
                    }
                }
                settle(tx, result).await?;
            }
        }
        tracing::info!(entity = %entity.path_segment, count = out.len(), "batch updated");
        Ok(out)
    }

    /// Delete each id in order; returns how many rows were removed.
    pub async fn batch_delete(
        pool: &PgPool,
        mode: BatchMode,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        ids: &[i64],
    ) -> Result<u64, AppError> {
        let mut deleted = 0u64;
        match mode {
            BatchMode::PerItem => {
                for id in ids {
                    let mut tx = pool.begin().await?;
                    let result = Self::delete(&mut tx, entity, scope, *id).await;
                    if settle(tx, result).await? {
                        deleted += 1;
                    }
                }
            }
            BatchMode::Atomic => {
                let mut tx = pool.begin().await?;
                let mut result = Ok(());
                for id in ids {
                    match Self::delete(&mut tx, entity, scope, *id).await {
                        Ok(true) => deleted += 1,
                        Ok(false) => {}
                        Err(e) => {
                            result = Err(e);
                            break;
                        }
                    }
                }
                settle(tx, result).await?;
            }
        }
        tracing::info!(entity = %entity.path_segment, deleted, "batch deleted");
        Ok(deleted)
    }

    /// Validated insert values with the owner column resolved.
    fn prepare_create(
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        body: &Map<String, Value>,
    ) -> Result<Assignments, AppError> {
        let mut values = RequestValidator::validate_create(entity, body)?;
        if let Some(column) = entity.owner_column.as_deref() {
            let owner = match scope.owner() {
                Some(owner) => owner.to_string(),
                // Unscoped callers must name the owner themselves.
                None => body
                    .get(column)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation(format!("{} is required", column)))?,
            };
            values.push((column.to_string(), PgBindValue::Text(owner)));
        }
        Ok(values)
    }

    async fn insert_prepared(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        values: &Assignments,
    ) -> Result<Value, AppError> {
        let q = sql::insert(entity, values);
        let row = Self::fetch_optional(conn, entity, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(entity = %entity.path_segment, id = ?row.get(ID_COLUMN), "created");
        Ok(row)
    }

    async fn update_prepared(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        scope: &RowScope<'_>,
        id: i64,
        sets: &Assignments,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(entity, id, sets, scope);
        let row = Self::fetch_optional(conn, entity, &q).await?;
        match &row {
            Some(_) => tracing::info!(entity = %entity.path_segment, id, fields = sets.len(), "updated"),
            None => tracing::warn!(entity = %entity.path_segment, id, "not found for update"),
        }
        Ok(row)
    }

    async fn fetch_optional(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        q: &QueryBuf,
    ) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&mut *conn).await?;
        row.map(|r| row_to_json(&r, entity)).transpose()
    }

    async fn fetch_all(
        conn: &mut PgConnection,
        entity: &ResolvedEntity,
        q: &QueryBuf,
    ) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&mut *conn).await?;
        rows.iter().map(|r| row_to_json(r, entity)).collect()
    }
}

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

/// Decode a row into a JSON object keyed by column, in catalogue order after `id`.
fn row_to_json(row: &PgRow, entity: &ResolvedEntity) -> Result<Value, AppError> {
    let mut map = Map::new();
    let id: i32 = row.try_get(ID_COLUMN)?;
    map.insert(ID_COLUMN.to_string(), Value::from(id));
    for c in &entity.columns {
        map.insert(c.name.clone(), cell_to_value(row, c)?);
    }
    Ok(Value::Object(map))
}

fn cell_to_value(row: &PgRow, c: &ColumnInfo) -> Result<Value, sqlx::Error> {
    let name = c.name.as_str();
    let v = match c.ty {
        FieldType::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        FieldType::Integer => row.try_get::<Option<i32>, _>(name)?.map(Value::from),
        FieldType::Float => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        FieldType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        FieldType::Date => row
            .try_get::<Option<NaiveDate>, _>(name)?
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        FieldType::DateTime => row
            .try_get::<Option<DateTime<Utc>>, _>(name)?
            .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
    };
    Ok(v.unwrap_or(Value::Null))
}
