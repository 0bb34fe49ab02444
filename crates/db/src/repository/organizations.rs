//! Organization (소속 회사) operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{NewOrganization, OrganizationRow},
    DbError,
};

pub async fn create_organization(
    pool: &PgPool,
    new: &NewOrganization,
) -> Result<OrganizationRow, DbError> {
    let row = sqlx::query_as::<_, OrganizationRow>(
        r#"
        INSERT INTO organizations (id, name, business_number, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, business_number, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.business_number)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_organization(pool: &PgPool, id: Uuid) -> Result<OrganizationRow, DbError> {
    sqlx::query_as::<_, OrganizationRow>(
        "SELECT id, name, business_number, created_at FROM organizations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// All organizations, or only `only` when given.  Ordered by name.
pub async fn list_organizations(
    pool: &PgPool,
    only: Option<Uuid>,
) -> Result<Vec<OrganizationRow>, DbError> {
    let rows = sqlx::query_as::<_, OrganizationRow>(
        r#"
        SELECT id, name, business_number, created_at
        FROM organizations
        WHERE ($1::uuid IS NULL OR id = $1)
        ORDER BY name ASC
        "#,
    )
    .bind(only)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
