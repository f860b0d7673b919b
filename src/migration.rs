//! Apply the resolved model to the database: schema, one table per entity, owner indexes.
//! Every statement is idempotent so startup can run it unconditionally.

use crate::config::{ResolvedEntity, ResolvedModel, ID_COLUMN};
use crate::error::AppError;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn full_name(entity: &ResolvedEntity) -> String {
    format!("{}.{}", quote(&entity.schema_name), quote(&entity.table_name))
}

/// CREATE TABLE IF NOT EXISTS with a serial `id` primary key followed by the declared columns.
pub fn create_table_sql(entity: &ResolvedEntity) -> String {
    let mut col_defs = vec![format!("{} SERIAL PRIMARY KEY", quote(ID_COLUMN))];
    for c in &entity.columns {
        let mut def = format!("{} {}", quote(&c.name), c.ty.pg_type());
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        full_name(entity),
        col_defs.join(",\n  ")
    )
}

/// Index on the owner column; `None` for shared entities.
pub fn owner_index_sql(entity: &ResolvedEntity) -> Option<String> {
    let column = entity.owner_column.as_deref()?;
    let index_name = format!("idx_{}_{}", entity.table_name, column);
    Some(format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        quote(&index_name),
        full_name(entity),
        quote(column)
    ))
}

/// Create the schema (if missing) and every entity table with its owner index.
pub async fn apply_schema(pool: &PgPool, model: &ResolvedModel) -> Result<(), AppError> {
    let mut schemas: Vec<&str> = model.entities.iter().map(|e| e.schema_name.as_str()).collect();
    schemas.dedup();
    for schema in schemas {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
            .execute(pool)
            .await?;
    }

    for entity in &model.entities {
        sqlx::query(&create_table_sql(entity)).execute(pool).await?;
        if let Some(sql) = owner_index_sql(entity) {
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::debug!(table = %entity.table_name, "table ensured");
    }
    tracing::info!(tables = model.entities.len(), "schema applied");
    Ok(())
}
