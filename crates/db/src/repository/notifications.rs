//! In-app notification operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{NewNotification, NotificationRow},
    DbError,
};

const COLUMNS: &str = "id, recipient_id, organization_id, title, body, kind, read_at, created_at";

pub async fn create_notification(
    pool: &PgPool,
    new: &NewNotification,
) -> Result<NotificationRow, DbError> {
    let sql = format!(
        "INSERT INTO notifications ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, NULL, $7) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, NotificationRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.recipient_id)
        .bind(new.organization_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.kind)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_notification(pool: &PgPool, id: Uuid) -> Result<NotificationRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
    sqlx::query_as::<_, NotificationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// A recipient's notifications, newest first.
pub async fn list_notifications(
    pool: &PgPool,
    recipient_id: Uuid,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<NotificationRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM notifications
        WHERE recipient_id = $1 AND (NOT $2 OR read_at IS NULL)
        ORDER BY created_at DESC
        LIMIT $3
        "#
    );
    let rows = sqlx::query_as::<_, NotificationRow>(&sql)
        .bind(recipient_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Stamp `read_at` once; reading twice keeps the first timestamp.
pub async fn mark_notification_read(pool: &PgPool, id: Uuid) -> Result<NotificationRow, DbError> {
    let sql = format!(
        "UPDATE notifications SET read_at = COALESCE(read_at, $2) WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, NotificationRow>(&sql)
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}
