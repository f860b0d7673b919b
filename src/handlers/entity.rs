//! Entity handlers: list, list-all, read, create, update, delete and their batch forms.
//! Thin pass-through to `CrudService`; each single-item request is one unit of work.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::extractors::{CallerId, JsonBody};
use crate::response::{BatchDeleted, Deleted};
use crate::service::unit::settle;
use crate::service::{body_to_map, BatchUpdateItem, CrudService, ListQuery, RowScope};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateRequest {
    pub items: Vec<BatchUpdateItem>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<i64>,
}

fn entity<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedEntity, AppError> {
    state
        .model
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(format!("entity {}", path_segment)))
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

fn not_found(entity: &ResolvedEntity, id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", entity.path_segment, id))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn list_scoped(
    state: &AppState,
    entity: &ResolvedEntity,
    scope: RowScope<'_>,
    params: &HashMap<String, String>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListQuery::from_params(entity, params)?;
    let mut tx = state.pool.begin().await?;
    let result = CrudService::get_list(&mut tx, entity, &scope, &query).await;
    let page = settle(tx, result).await?;
    tracing::debug!(entity = %entity.path_segment, total = page.total, "listed");
    Ok(Json(page))
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    caller: CallerId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    list_scoped(&state, entity, scope, &params).await
}

/// Same as `list` without owner scoping.
pub async fn list_all(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    list_scoped(&state, entity, RowScope::Global, &params).await
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    caller: CallerId,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let id = parse_id(&id_str)?;
    let mut tx = state.pool.begin().await?;
    let result = CrudService::get_by_id(&mut tx, entity, &scope, id).await;
    let row = settle(tx, result).await?.ok_or_else(|| not_found(entity, id))?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    caller: CallerId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let body = body_to_map(body)?;
    let mut tx = state.pool.begin().await?;
    let result = CrudService::create(&mut tx, entity, &scope, &body).await;
    let row = settle(tx, result).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    caller: CallerId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let mut tx = state.pool.begin().await?;
    let result = CrudService::update(&mut tx, entity, &scope, id, &body).await;
    let row = settle(tx, result).await?.ok_or_else(|| not_found(entity, id))?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    caller: CallerId,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let id = parse_id(&id_str)?;
    let mut tx = state.pool.begin().await?;
    let result = CrudService::delete(&mut tx, entity, &scope, id).await;
    if !settle(tx, result).await? {
        return Err(not_found(entity, id));
    }
    Ok(Json(Deleted::new(&entity.path_segment, id)))
}

pub async fn batch_create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    caller: CallerId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let request: BatchCreateRequest = parse_body(body)?;
    let items = request
        .items
        .into_iter()
        .map(body_to_map)
        .collect::<Result<Vec<_>, _>>()?;
    let rows = CrudService::batch_create(&state.pool, state.batch_mode, entity, &scope, &items).await?;
    Ok((StatusCode::CREATED, Json(rows)))
}

pub async fn batch_update(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    caller: CallerId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let request: BatchUpdateRequest = parse_body(body)?;
    let rows = CrudService::batch_update(&state.pool, state.batch_mode, entity, &scope, &request.items).await?;
    Ok(Json(rows))
}

pub async fn batch_delete(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    caller: CallerId,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity(&state, &path_segment)?;
    let scope = RowScope::for_caller(entity, caller.as_deref())?;
    let request: BatchDeleteRequest = parse_body(body)?;
    let deleted = CrudService::batch_delete(&state.pool, state.batch_mode, entity, &scope, &request.ids).await?;
    Ok(Json(BatchDeleted::new(&entity.path_segment, deleted)))
}
