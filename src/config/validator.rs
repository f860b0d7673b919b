//! Catalogue validation: identifiers, unique paths, ownership consistency.

use crate::config::{EntityDescriptor, FieldType, Ownership, ID_COLUMN};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static IDENTIFIER_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn identifier_re() -> Result<&'static Regex, ConfigError> {
    IDENTIFIER_RE
        .get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$"))
        .as_ref()
        .map_err(|e| ConfigError::Validation(format!("identifier pattern: {}", e)))
}

/// True when `s` is a lowercase PostgreSQL identifier that needs no quoting tricks.
pub fn is_identifier(s: &str) -> bool {
    identifier_re().map_or(false, |re| re.is_match(s))
}

pub fn validate(catalogue: &[EntityDescriptor]) -> Result<(), ConfigError> {
    let re = identifier_re()?;
    let mut paths = HashSet::new();

    for entity in catalogue {
        if !re.is_match(entity.name) {
            return Err(ConfigError::InvalidIdentifier(entity.name.to_string()));
        }
        if !paths.insert(entity.name) {
            return Err(ConfigError::DuplicatePathSegment(entity.name.to_string()));
        }
        if entity.fields.is_empty() {
            return Err(ConfigError::Validation(format!("{} has no fields", entity.name)));
        }

        let mut names = HashSet::new();
        for field in entity.fields {
            if !re.is_match(field.name) {
                return Err(ConfigError::InvalidIdentifier(format!("{}.{}", entity.name, field.name)));
            }
            if field.name == ID_COLUMN {
                return Err(ConfigError::Validation(format!(
                    "{}: '{}' is generated and cannot be declared",
                    entity.name, ID_COLUMN
                )));
            }
            if !names.insert(field.name) {
                return Err(ConfigError::DuplicateField {
                    entity: entity.name.to_string(),
                    field: field.name.to_string(),
                });
            }
        }

        if let Ownership::Owned { column } = entity.ownership {
            let owner = entity.fields.iter().find(|f| f.name == column).ok_or_else(|| {
                ConfigError::MissingOwnerColumn {
                    entity: entity.name.to_string(),
                    column: column.to_string(),
                }
            })?;
            if owner.ty != FieldType::Text || owner.nullable {
                return Err(ConfigError::Validation(format!(
                    "{}: owner column '{}' must be non-null text",
                    entity.name, column
                )));
            }
        }
    }

    Ok(())
}
