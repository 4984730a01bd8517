use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use events_server::config::Config;
use events_server::repository::InMemoryEventRepository;
use events_server::routes::{create_routes, AppState};

fn app() -> Router {
    let config = Config::from_lookup(|_| None);
    create_routes(
        AppState::new(Arc::new(InMemoryEventRepository::new())),
        &config,
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn event_body(title: &str) -> Value {
    json!({
        "title": title,
        "startDate": "2026-02-01T09:00:00.000Z",
        "endDate": "2026-02-01T17:00:00.000Z",
        "isOnline": false
    })
}

async fn seed(app: &Router, count: usize) {
    for i in 1..=count {
        let (status, _) = send(app, Method::POST, "/api/events", Some(event_body(&format!("Event {i}")))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "service": "events-api"}));
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();
    let mut body = event_body("NestJS Conference");
    body["description"] = json!("A conference about NestJS");
    body["location"] = json!("Douala");
    body["capacity"] = json!(200);

    let (status, created) = send(&app, Method::POST, "/api/events", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "NestJS Conference");
    assert_eq!(created["location"], "Douala");
    assert_eq!(created["capacity"], 200);
    assert_eq!(created["isOnline"], false);
    assert_eq!(created["startDate"], "2026-02-01T09:00:00Z");
    assert!(created["createdAt"].is_string());

    let (status, fetched) = send(&app, Method::GET, "/api/events/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({
            "startDate": "2026-02-01T09:00:00Z",
            "endDate": "2026-02-01T17:00:00Z"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "title");

    let (_, listing) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(listing["meta"]["total"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({"title": "Bad date", "startDate": "tomorrow"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_and_malformed_ids() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/events/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send(&app, Method::GET, "/api/events/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "id");
}

#[tokio::test]
async fn test_list_second_page_of_fifteen() {
    let app = app();
    seed(&app, 15).await;

    let (status, body) = send(&app, Method::GET, "/api/events?page=2&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    assert_eq!(
        body["meta"],
        json!({"page": 2, "limit": 10, "total": 15, "totalPages": 2})
    );
}

#[tokio::test]
async fn test_list_normalizes_raw_parameters() {
    let app = app();
    seed(&app, 3).await;

    let (_, body) = send(&app, Method::GET, "/api/events?page=0&limit=1000", None).await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 100);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = send(&app, Method::GET, "/api/events?page=x&limit=y", None).await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 10);
}

#[tokio::test]
async fn test_repeated_query_key_is_a_validation_error() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/events?page=1&page=2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "query");
}

#[tokio::test]
async fn test_list_search() {
    let app = app();
    let mut by_location = event_body("Meetup");
    by_location["location"] = json!("Conference Hall");
    for body in [event_body("RustConf"), by_location, event_body("Hackathon")] {
        send(&app, Method::POST, "/api/events", Some(body)).await;
    }

    let (_, body) = send(&app, Method::GET, "/api/events?search=CONF", None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Meetup", "RustConf"]);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&app, Method::GET, "/api/events?search=nothing", None).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["totalPages"], 0);
}

#[tokio::test]
async fn test_partial_update() {
    let app = app();
    let mut body = event_body("A");
    body["location"] = json!("X");
    send(&app, Method::POST, "/api/events", Some(body)).await;

    let (status, updated) = send(&app, Method::PUT, "/api/events/1", Some(json!({"title": "B"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "B");
    assert_eq!(updated["location"], "X");

    let (status, unchanged) = send(&app, Method::PUT, "/api/events/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = app();
    let (status, _) = send(&app, Method::PUT, "/api/events/7", Some(json!({"title": "B"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(listing["meta"]["total"], 0);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    seed(&app, 1).await;

    let (status, body) = send(&app, Method::DELETE, "/api/events/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Event 1 deleted"}));

    let (status, _) = send(&app, Method::GET, "/api/events/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/api/events/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event 1 deleted");
}

// Listing reads rows and count separately; these requests are sequential, so
// the count always agrees with the page here. Concurrent writers can break
// that agreement.
#[tokio::test]
async fn test_total_matches_rows_without_concurrent_writes() {
    let app = app();
    seed(&app, 4).await;
    let (_, body) = send(&app, Method::GET, "/api/events?limit=100", None).await;
    assert_eq!(
        body["meta"]["total"].as_u64().unwrap() as usize,
        body["data"].as_array().unwrap().len()
    );
}
