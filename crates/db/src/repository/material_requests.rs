//! Material request (자재 요청) operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{MaterialRequestFilter, MaterialRequestRow, NewMaterialRequest},
    DbError,
};

const COLUMNS: &str = "id, organization_id, site_id, requested_by, material_name, quantity, \
    unit, needed_by, status, note, created_at, updated_at";

/// Insert a new request in `pending` status.
pub async fn create_material_request(
    pool: &PgPool,
    new: &NewMaterialRequest,
) -> Result<MaterialRequestRow, DbError> {
    let sql = format!(
        r#"
        INSERT INTO material_requests ({COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $10, $10)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, MaterialRequestRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.organization_id)
        .bind(new.site_id)
        .bind(new.requested_by)
        .bind(&new.material_name)
        .bind(new.quantity)
        .bind(&new.unit)
        .bind(new.needed_by)
        .bind(&new.note)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_material_request(pool: &PgPool, id: Uuid) -> Result<MaterialRequestRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM material_requests WHERE id = $1");
    sqlx::query_as::<_, MaterialRequestRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

pub async fn list_material_requests(
    pool: &PgPool,
    filter: &MaterialRequestFilter,
) -> Result<Vec<MaterialRequestRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM material_requests
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR site_id = $2)
          AND ($3::uuid IS NULL OR requested_by = $3)
          AND ($4::text IS NULL OR status = $4)
        ORDER BY created_at DESC
        LIMIT $5
        "#
    );
    let rows = sqlx::query_as::<_, MaterialRequestRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .bind(filter.requested_by)
        .bind(&filter.status)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn set_material_request_status(
    pool: &PgPool,
    id: Uuid,
    status: &str,
) -> Result<MaterialRequestRow, DbError> {
    let sql = format!(
        "UPDATE material_requests SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, MaterialRequestRow>(&sql)
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}
