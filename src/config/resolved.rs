//! Resolved entity model: catalogue validated and flattened for runtime use.

use crate::config::{validate, EntityDescriptor, FieldType, Ownership, ID_COLUMN};
use crate::error::ConfigError;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub schema_name: String,
    pub table_name: String,
    pub path_segment: String,
    /// Declared attributes in order; `id` is not part of this list.
    pub columns: Vec<ColumnInfo>,
    /// Set for owner-scoped entities.
    pub owner_column: Option<String>,
}

impl ResolvedEntity {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True for `id` and every declared attribute.
    pub fn has_column(&self, name: &str) -> bool {
        name == ID_COLUMN || self.column(name).is_some()
    }

    pub fn is_owner_column(&self, name: &str) -> bool {
        self.owner_column.as_deref() == Some(name)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub entities: Vec<ResolvedEntity>,
    pub entity_by_path: HashMap<String, ResolvedEntity>,
}

impl ResolvedModel {
    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path)
    }
}

/// Validate the catalogue and place every entity in `schema_name`.
pub fn resolve(catalogue: &[EntityDescriptor], schema_name: &str) -> Result<ResolvedModel, ConfigError> {
    validate(catalogue)?;
    if !crate::config::is_identifier(schema_name) {
        return Err(ConfigError::InvalidIdentifier(schema_name.to_string()));
    }

    let mut entities = Vec::with_capacity(catalogue.len());
    let mut entity_by_path = HashMap::with_capacity(catalogue.len());
    for descriptor in catalogue {
        let columns = descriptor
            .fields
            .iter()
            .map(|f| ColumnInfo {
                name: f.name.to_string(),
                ty: f.ty,
                nullable: f.nullable,
            })
            .collect();
        let owner_column = match descriptor.ownership {
            Ownership::Owned { column } => Some(column.to_string()),
            Ownership::Shared => None,
        };
        let entity = ResolvedEntity {
            schema_name: schema_name.to_string(),
            table_name: descriptor.name.to_string(),
            path_segment: descriptor.name.to_string(),
            columns,
            owner_column,
        };
        entity_by_path.insert(entity.path_segment.clone(), entity.clone());
        entities.push(entity);
    }

    Ok(ResolvedModel {
        entities,
        entity_by_path,
    })
}
