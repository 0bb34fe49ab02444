//! Daily work report (작업일지) operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{DailyReportFilter, DailyReportRow, DailyReportUpdate, NewDailyReport},
    DbError,
};

const COLUMNS: &str = "id, site_id, organization_id, author_id, work_date, process_type, \
    worker_count, description, status, rejection_reason, created_at, updated_at";

/// Insert a new report in `draft` status.
pub async fn create_report(pool: &PgPool, new: &NewDailyReport) -> Result<DailyReportRow, DbError> {
    let sql = format!(
        r#"
        INSERT INTO daily_reports ({COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft', NULL, $9, $9)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DailyReportRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.site_id)
        .bind(new.organization_id)
        .bind(new.author_id)
        .bind(new.work_date)
        .bind(&new.process_type)
        .bind(new.worker_count)
        .bind(&new.description)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn get_report(pool: &PgPool, id: Uuid) -> Result<DailyReportRow, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM daily_reports WHERE id = $1");
    sqlx::query_as::<_, DailyReportRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Reports newest work date first.
pub async fn list_reports(
    pool: &PgPool,
    filter: &DailyReportFilter,
) -> Result<Vec<DailyReportRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS} FROM daily_reports
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR site_id = $2)
          AND ($3::uuid IS NULL OR author_id = $3)
          AND ($4::text IS NULL OR status = $4)
          AND ($5::date IS NULL OR work_date >= $5)
          AND ($6::date IS NULL OR work_date <= $6)
        ORDER BY work_date DESC, created_at DESC
        LIMIT $7
        "#
    );
    let rows = sqlx::query_as::<_, DailyReportRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.site_id)
        .bind(filter.author_id)
        .bind(&filter.status)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn update_report(
    pool: &PgPool,
    id: Uuid,
    update: &DailyReportUpdate,
) -> Result<DailyReportRow, DbError> {
    let sql = format!(
        r#"
        UPDATE daily_reports
        SET work_date = $2, process_type = $3, worker_count = $4, description = $5,
            updated_at = $6
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, DailyReportRow>(&sql)
        .bind(id)
        .bind(update.work_date)
        .bind(&update.process_type)
        .bind(update.worker_count)
        .bind(&update.description)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Set `status`; `rejection_reason` is overwritten (cleared when `None`).
pub async fn set_report_status(
    pool: &PgPool,
    id: Uuid,
    status: &str,
    rejection_reason: Option<&str>,
) -> Result<DailyReportRow, DbError> {
    let sql = format!(
        r#"
        UPDATE daily_reports
        SET status = $2, rejection_reason = $3, updated_at = $4
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, DailyReportRow>(&sql)
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

pub async fn delete_report(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM daily_reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
