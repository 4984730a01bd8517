use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::query::EventListQuery;
use crate::models::{Event, EventChanges, NewEvent, PageMeta};
use crate::repository::EventRepository;
use crate::utils::error::AppError;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Event>,
}

/// Process-local event store. Applies the same normalized listing query as
/// the Postgres repository, so paging and search behave identically.
#[derive(Default)]
pub struct InMemoryEventRepository {
    table: RwLock<Table>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, new: NewEvent) -> Result<Event, AppError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let event = Event {
            id: table.last_id,
            title: new.title,
            description: new.description,
            location: new.location,
            start_date: new.start_date,
            end_date: new.end_date,
            is_online: new.is_online,
            capacity: new.capacity,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(event.id, event.clone());

        Ok(event)
    }

    async fn get_by_id(&self, id: i64) -> Result<Event, AppError> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::event_not_found(id))
    }

    async fn list_paginated(
        &self,
        query: &EventListQuery,
    ) -> Result<(Vec<Event>, PageMeta), AppError> {
        let table = self.table.read().await;
        let pagination = query.pagination;

        let matching: Vec<&Event> = table
            .rows
            .values()
            .rev()
            .filter(|e| query.filter.as_ref().map_or(true, |f| f.matches(e)))
            .collect();

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit()).unwrap_or(0))
            .cloned()
            .collect();

        Ok((rows, pagination.meta(total)))
    }

    async fn update(&self, id: i64, changes: EventChanges) -> Result<Event, AppError> {
        let mut table = self.table.write().await;
        let event = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::event_not_found(id))?;

        if !changes.is_empty() {
            changes.apply_to(event);
            event.updated_at = Utc::now();
        }

        Ok(event.clone())
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }
}
