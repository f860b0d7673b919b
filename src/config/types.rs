//! Entity descriptor types: the declarative shape of every table the API exposes.

/// Scalar type of a stored attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl FieldType {
    /// PostgreSQL column type, also used for placeholder casts.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "double precision",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "timestamptz",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
}

/// Non-nullable field.
pub const fn required(name: &'static str, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name,
        ty,
        nullable: false,
    }
}

/// Nullable field.
pub const fn optional(name: &'static str, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name,
        ty,
        nullable: true,
    }
}

/// Whether rows of an entity belong to a caller. Fixed when the entity is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Rows carry the caller identity in `column`; scoped routes only see the caller's rows.
    Owned { column: &'static str },
    /// Rows are visible to every caller.
    Shared,
}

/// One catalogue entry. `name` is both the table name and the URL path segment.
#[derive(Clone, Copy, Debug)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub ownership: Ownership,
    /// Attributes in column order, excluding the generated `id`.
    pub fields: &'static [FieldDescriptor],
}

/// Owner column used by every owner-scoped entity in the catalogue.
pub const OWNER_COLUMN: &str = "user_id";

/// Primary key column of every entity.
pub const ID_COLUMN: &str = "id";
