//! Validation and response shaping over the event repository.

use std::num::IntErrorKind;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::db::query::{EventListQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::models::{CreateEventRequest, Event, EventPage, UpdateEventRequest};
use crate::repository::EventRepository;
use crate::utils::error::AppError;
use crate::utils::response::MessageResponse;

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListEventsParams {
    /// Unparseable numbers fall back to the defaults (page 1, limit 10).
    pub fn into_query(self) -> EventListQuery {
        EventListQuery::new(
            parse_number(self.page.as_deref(), DEFAULT_PAGE),
            parse_number(self.limit.as_deref(), DEFAULT_LIMIT),
            self.search.as_deref(),
        )
    }
}

// Integers beyond i64 saturate so they are clamped like any other
// out-of-range value; only non-numeric text takes the default.
fn parse_number(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) => n,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => default,
        },
    }
}

/// Parses an `{id}` path segment.
pub fn parse_event_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid("id", "must be an integer"))
}

#[derive(Clone)]
pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, params: ListEventsParams) -> Result<EventPage, AppError> {
        let query = params.into_query();
        let (data, meta) = self.repo.list_paginated(&query).await?;
        debug!(
            page = meta.page,
            limit = meta.limit,
            total = meta.total,
            filtered = query.filter.is_some(),
            "Listed events"
        );
        Ok(EventPage { data, meta })
    }

    pub async fn get(&self, id: i64) -> Result<Event, AppError> {
        self.repo.get_by_id(id).await
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, AppError> {
        let new = request.validate()?;
        let event = self.repo.create(new).await?;
        info!(id = event.id, "Event created");
        Ok(event)
    }

    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, AppError> {
        let changes = request.validate()?;
        let event = self.repo.update(id, changes).await?;
        info!(id, "Event updated");
        Ok(event)
    }

    /// Deleting an id that does not exist still reports success.
    pub async fn delete(&self, id: i64) -> Result<MessageResponse, AppError> {
        let removed = self.repo.delete(id).await?;
        if removed == 0 {
            debug!(id, "Delete matched no event");
        } else {
            info!(id, "Event deleted");
        }
        Ok(MessageResponse {
            message: format!("Event {} deleted", id),
        })
    }
}
