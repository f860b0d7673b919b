//! Row scope: which rows an operation may see or touch.

use crate::config::ResolvedEntity;
use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowScope<'a> {
    /// Only rows whose `column` equals `owner`; inserts carry `owner` in `column`.
    Owner { column: &'a str, owner: &'a str },
    /// Every row of the table.
    Global,
}

impl<'a> RowScope<'a> {
    /// Scope for a caller on an owner-aware route. Owner-scoped entities require an identity.
    pub fn for_caller(entity: &'a ResolvedEntity, caller: Option<&'a str>) -> Result<Self, AppError> {
        match (&entity.owner_column, caller) {
            (Some(column), Some(owner)) => Ok(RowScope::Owner {
                column: column.as_str(),
                owner,
            }),
            (Some(_), None) => Err(AppError::Unauthorized(format!(
                "{} requires a caller identity",
                entity.path_segment
            ))),
            (None, _) => Ok(RowScope::Global),
        }
    }

    pub fn owner(&self) -> Option<&'a str> {
        match self {
            RowScope::Owner { owner, .. } => Some(*owner),
            RowScope::Global => None,
        }
    }
}
