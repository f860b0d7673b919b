//! Shared application state for all routes. The model is immutable once resolved.

use crate::config::{BatchMode, ResolvedModel};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<ResolvedModel>,
    pub batch_mode: BatchMode,
}

impl AppState {
    pub fn new(pool: PgPool, model: ResolvedModel, batch_mode: BatchMode) -> Self {
        AppState {
            pool,
            model: Arc::new(model),
            batch_mode,
        }
    }
}
