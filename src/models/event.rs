use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::{AppError, FieldError};

/// A persisted event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_online: bool,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for inserting a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_online: bool,
    pub capacity: Option<i32>,
}

/// Validated partial update. `None` means "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_online: Option<bool>,
    pub capacity: Option<i32>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self == &EventChanges::default()
    }

    /// Merges the supplied fields into `event`, leaving the rest untouched.
    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
        if let Some(start_date) = self.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            event.end_date = end_date;
        }
        if let Some(is_online) = self.is_online {
            event.is_online = is_online;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = Some(capacity);
        }
    }
}

/// Body of `POST /events`. Every field is optional at the wire level so that
/// missing values surface as field errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_online: Option<bool>,
    pub capacity: Option<i64>,
}

/// Body of `PUT /events/{id}`. Absent and `null` fields are both left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_online: Option<bool>,
    pub capacity: Option<i64>,
}

impl CreateEventRequest {
    pub fn validate(self) -> Result<NewEvent, AppError> {
        let mut errors = Vec::new();

        let title = match self.title {
            Some(t) if !t.trim().is_empty() => Some(t),
            _ => {
                errors.push(FieldError::new("title", "is required"));
                None
            }
        };
        if self.start_date.is_none() {
            errors.push(FieldError::new("startDate", "is required"));
        }
        if self.end_date.is_none() {
            errors.push(FieldError::new("endDate", "is required"));
        }
        check_date_range(self.start_date, self.end_date, &mut errors);
        let capacity = check_capacity(self.capacity, &mut errors);

        match (title, self.start_date, self.end_date) {
            (Some(title), Some(start_date), Some(end_date)) if errors.is_empty() => Ok(NewEvent {
                title,
                description: self.description,
                location: self.location,
                start_date,
                end_date,
                is_online: self.is_online.unwrap_or(false),
                capacity,
            }),
            _ => Err(AppError::ValidationError(errors)),
        }
    }
}

impl UpdateEventRequest {
    /// Checks the supplied fields on their own. The date range is only
    /// checked when both `startDate` and `endDate` are in this request; a
    /// lone `endDate` is not compared against the stored `startDate`.
    pub fn validate(self) -> Result<EventChanges, AppError> {
        let mut errors = Vec::new();

        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        check_date_range(self.start_date, self.end_date, &mut errors);
        let capacity = check_capacity(self.capacity, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        Ok(EventChanges {
            title: self.title,
            description: self.description,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            is_online: self.is_online,
            capacity,
        })
    }
}

fn check_date_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    errors: &mut Vec<FieldError>,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.push(FieldError::new("endDate", "must be after startDate"));
        }
    }
}

fn check_capacity(capacity: Option<i64>, errors: &mut Vec<FieldError>) -> Option<i32> {
    let value = capacity?;
    if value < 0 {
        errors.push(FieldError::new("capacity", "must not be negative"));
        return None;
    }
    match i32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(FieldError::new("capacity", "is too large"));
            None
        }
    }
}
