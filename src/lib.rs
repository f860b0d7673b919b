//! POS back-office: a catalogue-driven REST backend over PostgreSQL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{resolve, BatchMode, ResolvedEntity, ResolvedModel, Settings, CATALOGUE};
pub use error::{AppError, ConfigError};
pub use migration::apply_schema;
pub use response::error_body;
pub use routes::{build_router, common_routes, entity_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
