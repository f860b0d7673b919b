//! Entity access service: generic CRUD over the resolved catalogue.

mod crud;
pub mod query;
mod scope;
pub mod unit;
mod validation;
pub use crud::{BatchUpdateItem, CrudService};
pub use query::ListQuery;
pub use scope::RowScope;
pub use validation::{body_to_map, RequestValidator};
