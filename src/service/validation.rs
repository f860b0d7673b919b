//! Payload validation against the entity's field descriptors.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::sql::PgBindValue;
use serde_json::{Map, Value};

pub type Assignments = Vec<(String, PgBindValue)>;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. Every non-nullable field except the owner column must be present and non-null.
    /// Returns coerced values for the known, non-null fields; `id`, the owner column and unknown keys are left out.
    pub fn validate_create(entity: &ResolvedEntity, body: &Map<String, Value>) -> Result<Assignments, AppError> {
        for c in &entity.columns {
            if c.nullable || entity.is_owner_column(&c.name) {
                continue;
            }
            if body.get(&c.name).map_or(true, Value::is_null) {
                return Err(AppError::Validation(format!("{} is required", c.name)));
            }
        }
        Self::coerce_known(entity, body)
    }

    /// Validate a partial update. Nulls are dropped; only supplied fields are checked.
    pub fn validate_partial(entity: &ResolvedEntity, body: &Map<String, Value>) -> Result<Assignments, AppError> {
        Self::coerce_known(entity, body)
    }

    fn coerce_known(entity: &ResolvedEntity, body: &Map<String, Value>) -> Result<Assignments, AppError> {
        let mut out = Vec::with_capacity(body.len());
        for c in &entity.columns {
            if entity.is_owner_column(&c.name) {
                continue;
            }
            match body.get(&c.name) {
                None | Some(Value::Null) => {}
                Some(v) => out.push((c.name.clone(), PgBindValue::coerce(c, v)?)),
            }
        }
        Ok(out)
    }
}

/// Body must be a JSON object.
pub fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
