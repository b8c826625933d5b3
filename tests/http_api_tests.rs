#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use unit_pricing::{AllocationPlan, Quote, SprintLogEntry, TaskCatalog, http_api};

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(TaskCatalog::default_library());
    http_api::router(state)
}

fn router_with_session_limit(max_sessions: usize) -> axum::Router {
    let state = http_api::AppState::with_max_sessions(TaskCatalog::default_library(), max_sessions);
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn create_session(app: &axum::Router, body: Value) -> u64 {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/sessions", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    created["id"].as_u64().unwrap()
}

#[tokio::test]
async fn sprint_log_lifecycle_via_http_api() {
    let app = new_router();
    let id = create_session(&app, json!({})).await;

    // Commit two tasks
    for task in ["Landscape Scan", "Advisory Session"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/sessions/{id}/log"),
                json!({ "task": task, "modifiers": { "phase": "Phase 1" } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Remove the first entry
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{id}/log/0")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed: SprintLogEntry = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(removed.task_name, "Landscape Scan");

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/log")))
        .await
        .unwrap();
    let entries: Vec<SprintLogEntry> = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].task_name, "Advisory Session");
    assert_eq!(entries[0].cost, 1200.0);

    // Out-of-range removal
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{id}/log/5")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_uses_session_rates() {
    let app = new_router();
    let id = create_session(
        &app,
        json!({
            "rates": {
                "tier_rates": { "director": 300, "leadership": 200, "coordinator": 100 },
                "overhead": { "kind": "percent", "value": 39 },
                "unit_price": 5000,
                "pricing_mode": "partner"
            }
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/quote"),
            json!({ "task": "landscape scan", "modifiers": { "additional_costs": 500 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let quote: Quote = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!((quote.breakdown.total_cost - 2224.0).abs() < 1e-9);
    assert_eq!(quote.display_units, 1.0);

    // Quoting does not touch the log
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/log")))
        .await
        .unwrap();
    let entries: Vec<SprintLogEntry> = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn invalid_rates_are_rejected() {
    let app = new_router();
    let id = create_session(&app, json!({})).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/sessions/{id}/rates"),
            json!({
                "tier_rates": { "director": 300, "leadership": 200, "coordinator": 100 },
                "unit_price": 0
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(error["error"], "invalid_request");

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/rates")))
        .await
        .unwrap();
    let rates: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(rates["unit_price"], 5000.0);
}

#[tokio::test]
async fn simulate_falls_back_to_scope_budget() {
    let app = new_router();
    let id = create_session(&app, json!({})).await;

    // No budget anywhere
    let response = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/simulate"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/sessions/{id}/scope"),
            json!({ "project_name": "Pilot", "periods": 2, "total_units": 4.0, "theme": "survey" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("POST", &format!("/sessions/{id}/simulate"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let plan: AllocationPlan = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(plan.periods, 2);
    assert_eq!(plan.per_period_share, 2.0);
    assert_eq!(plan.assignments[0].task_name, "Survey Design + Launch");
}

#[tokio::test]
async fn exports_render_csv_and_markdown() {
    let app = new_router();
    let id = create_session(&app, json!({ "scope": { "project_name": "Export Demo" } })).await;
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/log"),
            json!({ "task": "Sprint Design" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/export/csv")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csv = String::from_utf8(read_body(response).await).unwrap();
    assert!(csv.starts_with("domain,task,units"));
    assert!(csv.contains("Sprint Design"));

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/export/markdown")))
        .await
        .unwrap();
    let markdown = String::from_utf8(read_body(response).await).unwrap();
    assert!(markdown.starts_with("# Export Demo"));
    assert!(markdown.contains("## Cost Summary"));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/sessions/99"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(empty_request("GET", "/catalog"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let app = new_router();
    let id = create_session(&app, json!({})).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for (method, uri) in [
        ("GET", format!("/sessions/{id}")),
        ("GET", format!("/sessions/{id}/log")),
        ("DELETE", format!("/sessions/{id}")),
    ] {
        let response = app.clone().oneshot(empty_request(method, &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }
}

#[tokio::test]
async fn session_limit_frees_up_after_delete() {
    let app = router_with_session_limit(2);
    let first = create_session(&app, json!({})).await;
    create_session(&app, json!({})).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/sessions", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(error["error"], "session_limit");

    app.clone()
        .oneshot(empty_request("DELETE", &format!("/sessions/{first}")))
        .await
        .unwrap();
    let third = create_session(&app, json!({})).await;
    assert_ne!(third, first);
}

#[tokio::test]
async fn unbounded_periods_are_rejected() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/sessions",
            json!({ "scope": { "periods": u32::MAX } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let id = create_session(&app, json!({ "scope": { "total_units": 8.0 } })).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/sessions/{id}/scope"),
            json!({ "periods": u32::MAX, "total_units": 8.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/sessions/{id}/simulate"),
            json!({ "periods": u32::MAX }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(error["error"], "invalid_request");

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/sessions/{id}/scope")))
        .await
        .unwrap();
    let scope: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(scope["periods"], 4);
}
