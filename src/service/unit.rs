//! Unit of work: one transaction per request (or per batch item).

use crate::error::AppError;
use sqlx::{Postgres, Transaction};

/// Commit when `result` is Ok, otherwise roll back and hand the error back unchanged.
pub async fn settle<T>(tx: Transaction<'_, Postgres>, result: Result<T, AppError>) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            if matches!(err, AppError::Db(_)) {
                tracing::warn!(error = %err, "unit of work rolled back");
            } else {
                tracing::debug!(error = %err, "unit of work rolled back");
            }
            Err(err)
        }
    }
}
