use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

use crate::models::{CreateEventRequest, UpdateEventRequest};
use crate::routes::AppState;
use crate::services::events::{parse_event_id, ListEventsParams};
use crate::utils::error::AppError;
use crate::utils::response::json;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::invalid("body", rejection.body_text()))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) =
        params.map_err(|rejection| AppError::invalid("query", rejection.body_text()))?;
    let page = state.events.list(params).await?;
    Ok(json(StatusCode::OK, page))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.events.get(parse_event_id(&id)?).await?;
    Ok(json(StatusCode::OK, event))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let event = state.events.create(body(payload)?).await?;
    Ok(json(StatusCode::CREATED, event))
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let event = state.events.update(id, body(payload)?).await?;
    Ok(json(StatusCode::OK, event))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let confirmation = state.events.delete(parse_event_id(&id)?).await?;
    Ok(json(StatusCode::OK, confirmation))
}
