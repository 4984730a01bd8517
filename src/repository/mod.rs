//! Typed CRUD access to the event record store.

use async_trait::async_trait;

use crate::db::query::EventListQuery;
use crate::models::{Event, EventChanges, NewEvent, PageMeta};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventRepository;
pub use postgres::PgEventRepository;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts a row; the store assigns `id`, `createdAt` and `updatedAt`.
    async fn create(&self, new: NewEvent) -> Result<Event, AppError>;

    /// Fails with [`AppError::NotFound`] when no row has this id.
    async fn get_by_id(&self, id: i64) -> Result<Event, AppError>;

    /// One page of rows, newest first, plus the total count over the same filter.
    ///
    /// The rows and the count are read separately, so a write landing in
    /// between can make `total` disagree with the returned page.
    async fn list_paginated(
        &self,
        query: &EventListQuery,
    ) -> Result<(Vec<Event>, PageMeta), AppError>;

    /// Merges the supplied fields into an existing row. Never creates one.
    async fn update(&self, id: i64, changes: EventChanges) -> Result<Event, AppError>;

    /// Hard delete. Returns the number of rows removed (0 or 1).
    async fn delete(&self, id: i64) -> Result<u64, AppError>;
}
