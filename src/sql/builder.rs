//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from a resolved entity.
//! Identifiers come from the catalogue only; values are always bound parameters.

use crate::config::{ResolvedEntity, ID_COLUMN};
use crate::service::RowScope;
use crate::sql::PgBindValue;

/// Quote identifier for PostgreSQL (safe: only from catalogue).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quoted(&entity.schema_name), quoted(&entity.table_name))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder for `v`, cast to the column type when one is known.
    fn placeholder(&mut self, entity: &ResolvedEntity, column: &str, v: PgBindValue) -> String {
        let n = self.push_param(v);
        match entity.column(column) {
            Some(c) => format!("${}::{}", n, c.ty.pg_type()),
            None => format!("${}", n),
        }
    }
}

/// Exact-match condition on one column. A `Null` value matches SQL NULL.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: PgBindValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

/// `"id", "col", ...` in catalogue order.
fn select_column_list(entity: &ResolvedEntity) -> String {
    std::iter::once(quoted(ID_COLUMN))
        .chain(entity.columns.iter().map(|c| quoted(&c.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Owner condition first, then filters on known columns. Unknown filter columns are skipped.
fn where_clause(q: &mut QueryBuf, entity: &ResolvedEntity, scope: &RowScope<'_>, filters: &[Filter]) -> String {
    let mut parts = Vec::new();
    if let RowScope::Owner { column, owner } = scope {
        let n = q.push_param(PgBindValue::Text((*owner).to_string()));
        parts.push(format!("{} = ${}", quoted(column), n));
    }
    for f in filters {
        if !entity.has_column(&f.column) {
            continue;
        }
        if f.value == PgBindValue::Null {
            parts.push(format!("{} IS NULL", quoted(&f.column)));
        } else {
            let ph = q.placeholder(entity, &f.column, f.value.clone());
            parts.push(format!("{} = {}", quoted(&f.column), ph));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// Known sort column followed by an id tiebreaker; otherwise newest first.
fn order_clause(entity: &ResolvedEntity, sort: Option<&SortSpec>) -> String {
    match sort.filter(|s| entity.has_column(&s.column)) {
        Some(s) if s.column == ID_COLUMN => {
            format!(" ORDER BY {} {}", quoted(ID_COLUMN), direction(s.descending))
        }
        Some(s) => format!(
            " ORDER BY {} {}, {} DESC",
            quoted(&s.column),
            direction(s.descending),
            quoted(ID_COLUMN)
        ),
        None => format!(" ORDER BY {} DESC", quoted(ID_COLUMN)),
    }
}

fn direction(descending: bool) -> &'static str {
    if descending {
        "DESC"
    } else {
        "ASC"
    }
}

fn id_condition(q: &mut QueryBuf, id: i64, scope: &RowScope<'_>) -> String {
    let n = q.push_param(PgBindValue::I64(id));
    let mut cond = format!("{} = ${}", quoted(ID_COLUMN), n);
    if let RowScope::Owner { column, owner } = scope {
        let n = q.push_param(PgBindValue::Text((*owner).to_string()));
        cond.push_str(&format!(" AND {} = ${}", quoted(column), n));
    }
    cond
}

/// SELECT by id, restricted to the owner under an owner scope.
pub fn select_by_id(entity: &ResolvedEntity, id: i64, scope: &RowScope<'_>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cond = id_condition(&mut q, id, scope);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(entity),
        qualified_table(entity),
        cond
    );
    q
}

/// SELECT page with filters, sort, OFFSET and LIMIT.
pub fn select_list(
    entity: &ResolvedEntity,
    scope: &RowScope<'_>,
    filters: &[Filter],
    sort: Option<&SortSpec>,
    skip: i64,
    limit: i64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, entity, scope, filters);
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(entity),
        qualified_table(entity),
        where_sql,
        order_clause(entity, sort),
        limit.max(0),
        skip.max(0)
    );
    q
}

/// COUNT of rows matching scope and filters, independent of any page window.
pub fn count(entity: &ResolvedEntity, scope: &RowScope<'_>, filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, entity, scope, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table(entity), where_sql);
    q
}

/// INSERT the given (column, value) pairs; columns not listed fall back to NULL.
pub fn insert(entity: &ResolvedEntity, values: &[(String, PgBindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &entity.columns {
        let Some((_, v)) = values.iter().find(|(name, _)| *name == c.name) else {
            continue;
        };
        placeholders.push(q.placeholder(entity, &c.name, v.clone()));
        cols.push(quoted(&c.name));
    }
    let table = qualified_table(entity);
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only known columns from `sets`. `id` and the owner column are never set.
/// With nothing to set this degrades to a scoped SELECT, so an empty update reads the row unchanged.
pub fn update(
    entity: &ResolvedEntity,
    id: i64,
    sets: &[(String, PgBindValue)],
    scope: &RowScope<'_>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut assignments = Vec::new();
    for (k, v) in sets {
        if k == ID_COLUMN || entity.is_owner_column(k) || entity.column(k).is_none() {
            continue;
        }
        let ph = q.placeholder(entity, k, v.clone());
        assignments.push(format!("{} = {}", quoted(k), ph));
    }
    if assignments.is_empty() {
        return select_by_id(entity, id, scope);
    }
    let cond = id_condition(&mut q, id, scope);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        qualified_table(entity),
        assignments.join(", "),
        cond,
        select_column_list(entity)
    );
    q
}

/// DELETE by id, restricted to the owner under an owner scope. Returns the deleted id.
pub fn delete(entity: &ResolvedEntity, id: i64, scope: &RowScope<'_>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cond = id_condition(&mut q, id, scope);
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        qualified_table(entity),
        cond,
        quoted(ID_COLUMN)
    );
    q
}
