//! Site CRUD operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{NewSite, SiteFilter, SiteRow, SiteUpdate},
    DbError,
};

const COLUMNS: &str =
    "id, organization_id, name, address, status, start_date, end_date, created_at";

pub async fn create_site(pool: &PgPool, new: &NewSite) -> Result<SiteRow, DbError> {
    let sql = format!(
        "INSERT INTO sites ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, SiteRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.organization_id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.status)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_site(pool: &PgPool, id: Uuid) -> Result<SiteRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
    sqlx::query_as::<_, SiteRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Sites ordered by name.
pub async fn list_sites(pool: &PgPool, filter: &SiteFilter) -> Result<Vec<SiteRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM sites
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR id = $2)
        ORDER BY name ASC
        "#
    );
    let rows = sqlx::query_as::<_, SiteRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn update_site(pool: &PgPool, id: Uuid, update: &SiteUpdate) -> Result<SiteRow, DbError> {
    let sql = format!(
        r#"
        UPDATE sites
        SET name = $2, address = $3, status = $4, start_date = $5, end_date = $6
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, SiteRow>(&sql)
        .bind(id)
        .bind(&update.name)
        .bind(&update.address)
        .bind(&update.status)
        .bind(update.start_date)
        .bind(update.end_date)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Permanently delete a site by its primary key.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_site(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM sites WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
