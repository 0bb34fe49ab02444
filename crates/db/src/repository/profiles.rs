//! Profile operations.  Profiles are created by the auth hook or the
//! seeder; the dashboard only reads and reassigns them.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{NewProfile, ProfileFilter, ProfileRow, ProfileUpdate},
    DbError,
};

const COLUMNS: &str =
    "id, email, full_name, role, organization_id, site_id, restricted, active, created_at";

pub async fn create_profile(pool: &PgPool, new: &NewProfile) -> Result<ProfileRow, DbError> {
    let sql = format!(
        "INSERT INTO profiles ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(new.id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.role)
        .bind(new.organization_id)
        .bind(new.site_id)
        .bind(new.restricted)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<ProfileRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

pub async fn get_profile_by_email(pool: &PgPool, email: &str) -> Result<ProfileRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM profiles WHERE email = $1");
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

pub async fn list_profiles(
    pool: &PgPool,
    filter: &ProfileFilter,
) -> Result<Vec<ProfileRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM profiles
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR site_id = $2)
        ORDER BY full_name ASC
        "#
    );
    let rows = sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> Result<ProfileRow, DbError> {
    let sql = format!(
        r#"
        UPDATE profiles
        SET full_name = $2, role = $3, organization_id = $4, site_id = $5,
            restricted = $6, active = $7
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.role)
        .bind(update.organization_id)
        .bind(update.site_id)
        .bind(update.restricted)
        .bind(update.active)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}
