//! Document metadata operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{DocumentFilter, DocumentRow, NewDocument},
    DbError,
};

const COLUMNS: &str = "id, organization_id, site_id, owner_id, title, category, storage_path, \
    mime_type, file_size, created_at";

pub async fn create_document(pool: &PgPool, new: &NewDocument) -> Result<DocumentRow, DbError> {
    let sql = format!(
        "INSERT INTO documents ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.organization_id)
        .bind(new.site_id)
        .bind(new.owner_id)
        .bind(&new.title)
        .bind(&new.category)
        .bind(&new.storage_path)
        .bind(&new.mime_type)
        .bind(new.file_size)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_document(pool: &PgPool, id: Uuid) -> Result<DocumentRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
    sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Newest first.  With `viewer_id` set, other people's personal documents
/// are left out.
pub async fn list_documents(
    pool: &PgPool,
    filter: &DocumentFilter,
) -> Result<Vec<DocumentRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM documents
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR site_id = $2)
          AND ($3::text IS NULL OR category = $3)
          AND ($4::uuid IS NULL OR category <> 'personal' OR owner_id = $4)
        ORDER BY created_at DESC
        LIMIT $5
        "#
    );
    let rows = sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .bind(&filter.category)
        .bind(filter.viewer_id)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn delete_document(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
