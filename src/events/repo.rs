use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Event record; every event belongs to exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Event {
    /// All events owned by `user_id`. The owner filter lives here, server
    /// side; callers never pass a client-supplied owner id.
    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, location, created_at
            FROM events
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// A single event, only if owned by `user_id`.
    pub async fn find_owned(
        db: &PgPool,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, location, created_at
            FROM events
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
    ) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (user_id, title, description, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, location, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .fetch_one(db)
        .await
    }

    /// Delete an event if owned by `user_id`; returns whether a row went away.
    pub async fn delete_owned(
        db: &PgPool,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
