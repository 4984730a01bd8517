use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use crate::utils::response::json;

pub mod events;

pub use events::{create_event, delete_event, get_event, list_events, update_event};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "events-api",
    };

    json(StatusCode::OK, payload)
}
