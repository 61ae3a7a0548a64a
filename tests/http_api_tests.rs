#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode, header},
    response::Response,
};
use renovation_tracker::persistence::{PersistenceError, PersistenceResult, TrackerStore};
use renovation_tracker::{Renovation, RenovationItem, Tracker, http_api};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    http_api::router(http_api::AppState::new(Tracker::new()))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn send_text(app: &axum::Router, uri: &str, text: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain")
        .body(Body::from(text.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn create_renovation(app: &axum::Router) -> i64 {
    let response = send(app, "POST", "/renovations", Some(json!({ "name": "Apartment 42" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let renovation: Renovation = serde_json::from_slice(&body_bytes(response).await).unwrap();
    renovation.id
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn item_lifecycle_via_http_api() {
    let app = new_router();
    let rid = create_renovation(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/renovations/{rid}/items"),
        Some(json!({
            "item_number": "001",
            "description": "Granite countertop",
            "category": "Kitchen",
            "budget": 2500.0,
            "planned_date": "2024-01-05",
            "estimated_duration_days": 3
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: RenovationItem = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(created.renovation_id, rid);

    let response = send(&app, "GET", &format!("/items/{}", created.id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: RenovationItem = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(fetched.description, "Granite countertop");

    let response = send(
        &app,
        "PUT",
        &format!("/items/{}", created.id),
        Some(json!({
            "item_number": "001",
            "description": "Granite countertop",
            "status": "completed",
            "paid_value": 2300.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "completed");

    let response = send(&app, "DELETE", &format!("/items/{}", created.id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &format!("/items/{}", created.id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn invalid_item_is_a_bad_request() {
    let app = new_router();
    let rid = create_renovation(&app).await;
    let response = send(
        &app,
        "POST",
        &format!("/renovations/{rid}/items"),
        Some(json!({ "item_number": "001", "description": "Tiles", "budget": -5.0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("budget"));
}

#[tokio::test]
async fn gantt_endpoint_uses_the_given_today() {
    let app = new_router();
    let rid = create_renovation(&app).await;

    let response = send(&app, "GET", &format!("/renovations/{rid}/gantt?today=2024-06-15"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["date_range"]["start_date"], "2024-05-16");
    assert_eq!(body["date_range"]["end_date"], "2024-08-14");
    assert_eq!(body["gantt_items"], json!([]));
    assert_eq!(body["ticks"][0], "16/05");

    send(
        &app,
        "POST",
        &format!("/renovations/{rid}/items"),
        Some(json!({
            "item_number": "001",
            "description": "Tiles",
            "planned_date": "2024-01-05",
            "estimated_duration_days": 3
        })),
    )
    .await;
    let response = send(&app, "GET", &format!("/renovations/{rid}/gantt"), None).await;
    let body = body_json(response).await;
    assert_eq!(body["gantt_items"][0]["planned_end"], "2024-01-10");
    assert_eq!(body["gantt_items"][0]["category"], "Uncategorized");
    assert_eq!(body["categories"], json!(["Uncategorized"]));

    let response = send(&app, "GET", &format!("/renovations/{rid}/end-date"), None).await;
    assert_eq!(
        body_json(response).await,
        json!({ "estimated_end_date": "2024-01-10", "actual_end_date": null })
    );
}

#[tokio::test]
async fn unknown_renovation_views_are_not_found() {
    let app = new_router();
    for uri in [
        "/renovations/9",
        "/renovations/9/items",
        "/renovations/9/gantt",
        "/renovations/9/report",
        "/renovations/9/export.csv",
    ] {
        let response = send(&app, "GET", uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn duplicate_category_is_a_conflict() {
    let app = new_router();
    let response = send(&app, "POST", "/categories", Some(json!({ "name": "Kitchen" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = send(&app, "POST", "/categories", Some(json!({ "name": "kitchen" }))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, "GET", "/categories", None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = send(&app, "DELETE", "/categories/1", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn supplier_crud_via_http_api() {
    let app = new_router();
    let response = send(
        &app,
        "POST",
        "/suppliers",
        Some(json!({ "name": "Casa & Obra", "email": "vendas@casaeobra.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        "PUT",
        "/suppliers/1",
        Some(json!({ "name": "Casa & Obra", "phone": "+55 11 5555-0000" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["phone"], "+55 11 5555-0000");
    assert!(body.get("email").is_none());

    let response = send(
        &app,
        "POST",
        "/suppliers",
        Some(json!({ "name": "Broken", "email": "nope" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_export_and_import_round_trip() {
    let app = new_router();
    let rid = create_renovation(&app).await;
    send(
        &app,
        "POST",
        &format!("/renovations/{rid}/items"),
        Some(json!({
            "item_number": "001",
            "description": "Paint",
            "category": "Painting",
            "budget": 800.0
        })),
    )
    .await;

    let response = send(&app, "GET", &format!("/renovations/{rid}/export.csv"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(csv.contains("001,Painting,Paint"));

    let other = create_renovation(&app).await;
    let response = send_text(&app, &format!("/renovations/{other}/import.csv"), &csv).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["imported"], 1);
    assert_eq!(body["items"][0]["renovation_id"], other);
    assert_eq!(body["items"][0]["category_data"]["name"], "Painting");
}

#[tokio::test]
async fn yaml_import_rejects_empty_documents() {
    let app = new_router();
    let rid = create_renovation(&app).await;
    let response = send_text(&app, &format!("/renovations/{rid}/import.yaml"), "renovation_items:\n").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let doc = "renovation_items:\n  - itemNumber: \"001\"\n    description: \"Shower\"\n    budget: 1500\n";
    let response = send_text(&app, &format!("/renovations/{rid}/import.yaml"), doc).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, "GET", &format!("/renovations/{rid}/export.yaml"), None).await;
    let yaml = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(yaml.contains("    description: \"Shower\"\n"));
}

#[tokio::test]
async fn report_and_cascade_delete() {
    let app = new_router();
    let rid = create_renovation(&app).await;
    for (number, budget, paid) in [("001", 1000.0, 400.0), ("002", 500.0, 0.0)] {
        send(
            &app,
            "POST",
            &format!("/renovations/{rid}/items"),
            Some(json!({
                "item_number": number,
                "description": "Work",
                "budget": budget,
                "paid_value": paid
            })),
        )
        .await;
    }

    let response = send(&app, "GET", &format!("/renovations/{rid}/report"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["item_count"], 2);
    assert_eq!(report["total_budget"], 1500.0);
    assert_eq!(report["remaining_budget"], 1100.0);

    let response = send(&app, "DELETE", &format!("/renovations/{rid}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, "GET", "/items/1", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

struct RejectingStore;

impl TrackerStore for RejectingStore {
    fn save_tracker(&self, _tracker: &Tracker) -> PersistenceResult<()> {
        Err(PersistenceError::InvalidData("disk is read-only".into()))
    }

    fn load_tracker(&self) -> PersistenceResult<Option<Tracker>> {
        Ok(None)
    }
}

#[tokio::test]
async fn failed_save_leaves_served_state_untouched() {
    let mut seeded = Tracker::new();
    seeded
        .create_renovation(renovation_tracker::RenovationDraft::new("Beach house"))
        .unwrap();
    let app = http_api::router(
        http_api::AppState::new(seeded).with_store(Arc::new(RejectingStore)),
    );

    let response = send(&app, "POST", "/renovations", Some(json!({ "name": "Apartment 42" }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "internal_error");

    let response = send(&app, "GET", "/renovations/2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", "/renovations/1", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let response = send(&app, "GET", "/renovations", None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Beach house");
}
