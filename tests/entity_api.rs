//! HTTP-level tests against a throwaway PostgreSQL database per test.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pos_backoffice::service::RowScope;
use pos_backoffice::{apply_schema, build_router, resolve, AppState, BatchMode, CrudService, CATALOGUE};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashSet;
use tower::ServiceExt;

const BASE: &str = "/api/v1/entities";

async fn create_test_app(pool: PgPool, batch_mode: BatchMode) -> Router {
    let model = resolve(CATALOGUE, "public").unwrap();
    apply_schema(&pool, &model).await.unwrap();
    build_router(AppState::new(pool, model, batch_mode), 1024 * 1024)
}

async fn call(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn call_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn product(name: &str, quantity: i64) -> Value {
    json!({
        "name": name,
        "category": "snacks",
        "quantity": quantity,
        "cost_price": 1.25,
        "sell_price": 2.5,
        "low_stock_threshold": 3
    })
}

fn customer(code: &str) -> Value {
    json!({"customer_code": code, "name": format!("Customer {}", code)})
}

fn id_of(v: &Value) -> i64 {
    v["id"].as_i64().unwrap()
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_product_lifecycle(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;

    let (status, created) = call(&app, Method::POST, &format!("{BASE}/products"), None, Some(product("Fresh Milk 1L", 150))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&created);
    assert_eq!(created["name"], "Fresh Milk 1L");
    assert_eq!(created["sell_price"], 2.5);
    let keys: Vec<&str> = created.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "name", "category", "quantity", "cost_price", "sell_price", "low_stock_threshold"]
    );

    let (status, fetched) = call(&app, Method::GET, &format!("{BASE}/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("{BASE}/products/{id}"),
        None,
        Some(json!({"quantity": 140, "name": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 140);
    assert_eq!(updated["name"], "Fresh Milk 1L");
    assert_eq!(updated["cost_price"], created["cost_price"]);

    let (status, deleted) = call(&app, Method::DELETE, &format!("{BASE}/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);
    assert!(deleted["message"].as_str().unwrap().contains("deleted"));

    let (status, body) = call(&app, Method::GET, &format!("{BASE}/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = call(&app, Method::DELETE, &format!("{BASE}/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_empty_update_returns_record_unchanged(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    let (_, created) = call(&app, Method::POST, &format!("{BASE}/products"), None, Some(product("Soda", 7))).await;
    let id = id_of(&created);

    let (status, updated) = call(&app, Method::PUT, &format!("{BASE}/products/{id}"), None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, created);

    let (status, _) = call(&app, Method::PUT, &format!("{BASE}/products/999999"), None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_invalid_input_is_rejected(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;

    let mut missing = product("Gum", 1);
    missing.as_object_mut().unwrap().remove("category");
    let (status, body) = call(&app, Method::POST, &format!("{BASE}/products"), None, Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let mut wrong_type = product("Gum", 1);
    wrong_type["quantity"] = json!("lots");
    let (status, _) = call(&app, Method::POST, &format!("{BASE}/products"), None, Some(wrong_type)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, &format!("{BASE}/products/abc"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, &format!("{BASE}/products?limit=0"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, &format!("{BASE}/products?query=not-json"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, &format!("{BASE}/widgets"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = call_raw(&app, &format!("{BASE}/products"), Some("application/json"), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = call_raw(&app, &format!("{BASE}/products"), None, &product("Gum", 1).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = call(&app, Method::POST, &format!("{BASE}/products/batch"), None, Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/products"), None, None).await;
    assert_eq!(page["total"], 0);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_owned_entity_requires_caller(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;

    let (status, body) = call(&app, Method::GET, &format!("{BASE}/customers"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = call(&app, Method::POST, &format!("{BASE}/customers"), Some("  "), Some(customer("C1"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, &format!("{BASE}/products"), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_owner_isolation(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    let alice = uuid::Uuid::new_v4().to_string();
    let bob = uuid::Uuid::new_v4().to_string();

    let mut body = customer("C1");
    body["user_id"] = json!(bob.clone());
    let (status, created) = call(&app, Method::POST, &format!("{BASE}/customers"), Some(&alice), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_id"], alice.as_str());
    let id = id_of(&created);

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/customers"), Some(&alice), None).await;
    assert_eq!(page["total"], 1);

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/customers"), Some(&bob), None).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));

    let uri = format!("{BASE}/customers/{id}");
    let (status, _) = call(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::PUT, &uri, Some(&bob), Some(json!({"name": "Hijacked"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = call(&app, Method::PUT, &uri, Some(&alice), Some(json!({"user_id": bob.clone()}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user_id"], alice.as_str());

    let (status, page) = call(&app, Method::GET, &format!("{BASE}/customers/all"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Customer C1");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_pagination_and_filters(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    let mut all_ids = HashSet::new();
    for (i, name) in ["e", "d", "c", "b", "a"].iter().enumerate() {
        let (_, created) = call(&app, Method::POST, &format!("{BASE}/products"), None, Some(product(name, i as i64))).await;
        all_ids.insert(id_of(&created));
    }

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for skip in [0, 2, 4] {
        let (status, page) = call(
            &app,
            Method::GET,
            &format!("{BASE}/products?sort=name&skip={skip}&limit=2"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 5);
        assert_eq!(page["skip"], skip);
        assert_eq!(page["limit"], 2);
        for item in page["items"].as_array().unwrap() {
            assert!(seen.insert(id_of(item)));
            names.push(item["name"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(seen, all_ids);
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/products?sort=-quantity&limit=1"), None, None).await;
    assert_eq!(page["items"][0]["quantity"], 4);

    // {"quantity":2}
    let (_, page) = call(&app, Method::GET, &format!("{BASE}/products?query=%7B%22quantity%22%3A2%7D"), None, None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "c");

    // {"nonexistent":1}
    let (status, page) = call(
        &app,
        Method::GET,
        &format!("{BASE}/products?query=%7B%22nonexistent%22%3A1%7D&sort=bogus"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 5);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_batch_with_invalid_item_writes_nothing(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    let user = uuid::Uuid::new_v4().to_string();

    let items = json!({"items": [customer("C1"), {"name": "no code"}, customer("C3")]});
    let (status, body) = call(&app, Method::POST, &format!("{BASE}/customers/batch"), Some(&user), Some(items)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/customers"), Some(&user), None).await;
    assert_eq!(page["total"], 0);
}

async fn batch_round(app: &Router, user: &str) {
    let items = json!({"items": [customer("C1"), customer("C2"), customer("C3")]});
    let (status, created) = call(app, Method::POST, &format!("{BASE}/customers/batch"), Some(user), Some(items)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.as_array().unwrap().clone();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|c| c["user_id"] == user));
    let ids: Vec<i64> = created.iter().map(id_of).collect();

    let updates = json!({"items": [
        {"id": ids[0], "updates": {"loyalty_points": 10}},
        {"id": 999999, "updates": {"loyalty_points": 1}},
        {"id": ids[1]}
    ]});
    let (status, updated) = call(app, Method::PUT, &format!("{BASE}/customers/batch"), Some(user), Some(updates)).await;
    assert_eq!(status, StatusCode::OK);
    let updated = updated.as_array().unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0]["loyalty_points"], 10);

    let (status, deleted) = call(
        app,
        Method::DELETE,
        &format!("{BASE}/customers/batch"),
        Some(user),
        Some(json!({"ids": [ids[0], ids[2], 999999]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted_count"], 2);

    let (_, page) = call(app, Method::GET, &format!("{BASE}/customers"), Some(user), None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], ids[1]);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_batch_operations_per_item(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    batch_round(&app, &uuid::Uuid::new_v4().to_string()).await;
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_batch_operations_atomic(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::Atomic).await;
    batch_round(&app, &uuid::Uuid::new_v4().to_string()).await;
}

/// Second item passes validation but PostgreSQL rejects the NUL byte in its text.
async fn batch_with_storage_failure(app: &Router, user: &str) -> u64 {
    let items = json!({"items": [customer("C1"), customer("bad\u{0000}"), customer("C3")]});
    let (status, body) = call(app, Method::POST, &format!("{BASE}/customers/batch"), Some(user), Some(items)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "database_error");

    let (_, page) = call(app, Method::GET, &format!("{BASE}/customers"), Some(user), None).await;
    page["total"].as_u64().unwrap()
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_batch_storage_failure_keeps_earlier_items_per_item(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;
    let user = uuid::Uuid::new_v4().to_string();
    assert_eq!(batch_with_storage_failure(&app, &user).await, 1);

    let (_, page) = call(&app, Method::GET, &format!("{BASE}/customers"), Some(&user), None).await;
    assert_eq!(page["items"][0]["customer_code"], "C1");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_batch_storage_failure_rolls_back_all_atomic(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::Atomic).await;
    let user = uuid::Uuid::new_v4().to_string();
    assert_eq!(batch_with_storage_failure(&app, &user).await, 0);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_service_routes(pool: PgPool) {
    let app = create_test_app(pool, BatchMode::PerItem).await;

    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (_, body) = call(&app, Method::GET, "/version", None, None).await;
    assert_eq!(body["name"], "pos-backoffice");

    let (status, body) = call(&app, Method::GET, "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn test_lookup_by_field(pool: PgPool) {
    let model = resolve(CATALOGUE, "public").unwrap();
    apply_schema(&pool, &model).await.unwrap();
    let customers = model.entity_by_path("customers").unwrap();
    let scope = RowScope::Owner { column: "user_id", owner: "u-1" };
    let mut conn = pool.acquire().await.unwrap();

    for code in ["A1", "A2"] {
        let body = customer(code);
        CrudService::create(&mut conn, customers, &scope, body.as_object().unwrap())
            .await
            .unwrap();
    }
    let other = RowScope::Owner { column: "user_id", owner: "u-2" };
    CrudService::create(&mut conn, customers, &other, customer("A1").as_object().unwrap())
        .await
        .unwrap();

    let found = CrudService::get_by_field(&mut conn, customers, &scope, "customer_code", &json!("A1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["user_id"], "u-1");

    let rows = CrudService::list_by_field(&mut conn, customers, &RowScope::Global, "customer_code", &json!("A1"), 0, 10)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let missing = CrudService::get_by_field(&mut conn, customers, &scope, "customer_code", &json!("ZZ"))
        .await
        .unwrap();
    assert!(missing.is_none());

    assert!(CrudService::get_by_field(&mut conn, customers, &scope, "nope", &json!(1)).await.is_err());
}
