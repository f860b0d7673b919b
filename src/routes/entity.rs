//! Entity CRUD routes over the resolved catalogue.
//! Paths are parameterized so one router serves every entity; handlers resolve the entity by path segment.
//! Static segments (`all`, `batch`) take priority over `:id`.

use crate::handlers::entity::{
    batch_create, batch_delete, batch_update, create, delete as delete_handler, list, list_all, read,
    update,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create))
        .route("/:path_segment/all", get(list_all))
        .route(
            "/:path_segment/batch",
            post(batch_create).put(batch_update).delete(batch_delete),
        )
        .route(
            "/:path_segment/:id",
            get(read).put(update).delete(delete_handler),
        )
        .with_state(state)
}
