//! HTTP API tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`, covering
//! tenant-header enforcement, the error-envelope status mapping, and the
//! happy paths of each endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use sbo_common::db::init::create_schema;
use sbo_common::db::models::Customer;
use sbo_identity::db::customers;
use sbo_identity::{build_router, AppState};

async fn test_app() -> (axum::Router, SqlitePool) {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    create_schema(&pool).await.unwrap();
    let app = build_router(AppState::new(pool.clone()));
    (app, pool)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, tenant: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header("X-Tenant-Id", tenant);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn health_needs_no_tenant() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "sbo-identity");
}

#[tokio::test]
async fn missing_tenant_header_is_rejected() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(request("GET", "/customers/candidates?name=Demir", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn candidate_lookup_returns_ranked_list() {
    let (app, pool) = test_app().await;

    let mut customer = Customer::new("t1".to_string());
    customer.national_id = Some("11111111111".to_string());
    customer.first_name = Some("Ayşe".to_string());
    customer.last_name = Some("Yılmaz".to_string());
    customers::insert_customer(&pool, &customer).await.unwrap();

    let response = app
        .oneshot(request(
            "GET",
            "/customers/candidates?national_id=11111111111",
            Some("t1"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["confidence"], "exact");
    assert_eq!(body[0]["matched_by"], "national_id");
    assert_eq!(body[0]["display_name"], "Ayşe Yılmaz");
}

#[tokio::test]
async fn resolve_reports_no_match_without_creating() {
    let (app, pool) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/customers/resolve",
            Some("t1"),
            Some(json!({ "national_id": "99999999999" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["customer_guid"], Value::Null);
    assert_eq!(body["confidence"], "none");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn import_match_creates_and_flags_rows() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            "/import/match",
            Some("t1"),
            Some(json!({
                "rows": [
                    { "row_id": "1", "national_id": "11111111111", "name": "Ayşe Yılmaz" },
                    { "row_id": "2", "national_id": "11111111111" }
                ]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["auto_created"], true);
    assert_eq!(rows[1]["auto_created"], false);
    assert_eq!(rows[0]["customer_guid"], rows[1]["customer_guid"]);
}

#[tokio::test]
async fn assignment_endpoint_validates_and_assigns() {
    let (app, pool) = test_app().await;

    let record_guid = Uuid::new_v4();
    sqlx::query("INSERT INTO confirmed_records (guid, tenant_id) VALUES (?, 't1')")
        .bind(record_guid.to_string())
        .execute(&pool)
        .await
        .unwrap();

    // No identifier supplied
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/records/confirmed/{}/assign-identity", record_guid),
            Some("t1"),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown record
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/records/confirmed/{}/assign-identity", Uuid::new_v4()),
            Some("t1"),
            Some(json!({ "national_id": "11111111111" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Valid assignment auto-creates
    let response = app
        .oneshot(request(
            "POST",
            &format!("/records/confirmed/{}/assign-identity", record_guid),
            Some("t1"),
            Some(json!({ "national_id": "11111111111" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["auto_created"], true);
    assert_eq!(body["cascade_count"], 0);
}

#[tokio::test]
async fn unknown_store_in_path_is_rejected() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/records/policies/{}/assign-identity", Uuid::new_v4()),
            Some("t1"),
            Some(json!({ "national_id": "11111111111" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn merge_endpoint_maps_taxonomy_to_statuses() {
    let (app, pool) = test_app().await;

    let ours = Customer::new("t1".to_string());
    customers::insert_customer(&pool, &ours).await.unwrap();
    let theirs = Customer::new("t2".to_string());
    customers::insert_customer(&pool, &theirs).await.unwrap();
    let mut secondary = Customer::new("t1".to_string());
    secondary.email = Some("a@b.com".to_string());
    customers::insert_customer(&pool, &secondary).await.unwrap();

    // Self-merge
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/customers/{}/merge/{}", ours.guid, ours.guid),
            Some("t1"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Cross-tenant
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/customers/{}/merge/{}", ours.guid, theirs.guid),
            Some("t1"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Valid merge
    let response = app
        .oneshot(request(
            "POST",
            &format!("/customers/{}/merge/{}", ours.guid, secondary.guid),
            Some("t1"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["confirmed_updated"], 0);
}
