use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::query::{EventListQuery, EVENT_COLUMNS};
use crate::models::{Event, EventChanges, NewEvent, PageMeta};
use crate::repository::EventRepository;
use crate::utils::error::AppError;

/// Event repository over the `events` table.
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, new: NewEvent) -> Result<Event, AppError> {
        let sql = format!(
            "INSERT INTO events \
             (title, description, location, start_date, end_date, is_online, capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EVENT_COLUMNS}"
        );

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(new.title)
            .bind(new.description)
            .bind(new.location)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(new.is_online)
            .bind(new.capacity)
            .fetch_one(&self.pool)
            .await?;

        Ok(event)
    }

    async fn get_by_id(&self, id: i64) -> Result<Event, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::event_not_found(id))
    }

    async fn list_paginated(
        &self,
        query: &EventListQuery,
    ) -> Result<(Vec<Event>, PageMeta), AppError> {
        let select_sql = query.select_sql();
        let count_sql = query.count_sql();
        let pagination = query.pagination;

        // Both statements run on one connection, returned to the pool on drop.
        let mut conn = self.pool.acquire().await?;

        let rows = query
            .bind_filter(sqlx::query_as::<_, Event>(&select_sql))
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut *conn)
            .await?;

        let (total,) = query
            .bind_filter(sqlx::query_as::<_, (i64,)>(&count_sql))
            .fetch_one(&mut *conn)
            .await?;

        Ok((rows, pagination.meta(total)))
    }

    async fn update(&self, id: i64, changes: EventChanges) -> Result<Event, AppError> {
        if changes.is_empty() {
            return self.get_by_id(id).await;
        }

        let sql = format!(
            "UPDATE events SET \
             title = COALESCE($1, title), \
             description = COALESCE($2, description), \
             location = COALESCE($3, location), \
             start_date = COALESCE($4, start_date), \
             end_date = COALESCE($5, end_date), \
             is_online = COALESCE($6, is_online), \
             capacity = COALESCE($7, capacity), \
             updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.location)
            .bind(changes.start_date)
            .bind(changes.end_date)
            .bind(changes.is_online)
            .bind(changes.capacity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::event_not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
