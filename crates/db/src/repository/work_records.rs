//! Attendance rows (출역 기록) feeding the payroll calculation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{NewWorkRecord, WorkRecordFilter, WorkRecordRow},
    DbError,
};

const COLUMNS: &str =
    "id, organization_id, site_id, profile_id, work_date, labor_hours, created_at";

pub async fn create_work_record(pool: &PgPool, new: &NewWorkRecord) -> Result<WorkRecordRow, DbError> {
    let sql = format!(
        "INSERT INTO work_records ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, WorkRecordRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.organization_id)
        .bind(new.site_id)
        .bind(new.profile_id)
        .bind(new.work_date)
        .bind(new.labor_hours)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Records in ascending work-date order.  A `NULL` limit means no limit.
pub async fn list_work_records(
    pool: &PgPool,
    filter: &WorkRecordFilter,
) -> Result<Vec<WorkRecordRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM work_records
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR site_id = $2)
          AND ($3::uuid IS NULL OR profile_id = $3)
          AND ($4::date IS NULL OR work_date >= $4)
          AND ($5::date IS NULL OR work_date <= $5)
        ORDER BY work_date ASC, created_at ASC
        LIMIT $6
        "#
    );
    let rows = sqlx::query_as::<_, WorkRecordRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .bind(filter.profile_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
