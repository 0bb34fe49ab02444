//! Salary settings and monthly snapshots.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{
        NewSalarySetting, NewSalarySnapshot, SalarySettingRow, SalarySnapshotFilter,
        SalarySnapshotRow,
    },
    DbError,
};

const SETTING_COLUMNS: &str = "id, profile_id, daily_wage, tax_rate, effective_from, created_at";

const SNAPSHOT_COLUMNS: &str = "id, organization_id, profile_id, year, month, total_hours, \
    man_days, daily_wage, tax_rate, gross_pay, tax_amount, net_pay, created_by, created_at";

// ---------------------------------------------------------------------------
// salary_settings
// ---------------------------------------------------------------------------

pub async fn create_salary_setting(
    pool: &PgPool,
    new: &NewSalarySetting,
) -> Result<SalarySettingRow, DbError> {
    let sql = format!(
        "INSERT INTO salary_settings ({SETTING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SETTING_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SalarySettingRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.profile_id)
        .bind(new.daily_wage)
        .bind(new.tax_rate)
        .bind(new.effective_from)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Settings for one profile, oldest `effective_from` first.
pub async fn list_salary_settings(
    pool: &PgPool,
    profile_id: Uuid,
) -> Result<Vec<SalarySettingRow>, DbError> {
    let sql = format!(
        "SELECT {SETTING_COLUMNS} FROM salary_settings WHERE profile_id = $1 ORDER BY effective_from ASC"
    );
    let rows = sqlx::query_as::<_, SalarySettingRow>(&sql)
        .bind(profile_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// salary_snapshots
// ---------------------------------------------------------------------------

/// Freeze a payslip.  A second snapshot for the same profile and month
/// fails with `DbError::Conflict`.
pub async fn create_salary_snapshot(
    pool: &PgPool,
    new: &NewSalarySnapshot,
) -> Result<SalarySnapshotRow, DbError> {
    let sql = format!(
        r#"
        INSERT INTO salary_snapshots ({SNAPSHOT_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {SNAPSHOT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SalarySnapshotRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.organization_id)
        .bind(new.profile_id)
        .bind(new.year)
        .bind(new.month)
        .bind(new.total_hours)
        .bind(new.man_days)
        .bind(new.daily_wage)
        .bind(new.tax_rate)
        .bind(new.gross_pay)
        .bind(new.tax_amount)
        .bind(new.net_pay)
        .bind(new.created_by)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

pub async fn list_salary_snapshots(
    pool: &PgPool,
    filter: &SalarySnapshotFilter,
) -> Result<Vec<SalarySnapshotRow>, DbError> {
    let sql = format!(
        r#"
        SELECT {SNAPSHOT_COLUMNS} FROM salary_snapshots
        WHERE ($1::uuid IS NULL OR organization_id = $1)
          AND ($2::uuid IS NULL OR profile_id = $2)
          AND ($3::int IS NULL OR year = $3)
          AND ($4::int IS NULL OR month = $4)
        ORDER BY year DESC, month DESC, created_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, SalarySnapshotRow>(&sql)
        .bind(filter.organization_id)
        .bind(filter.profile_id)
        .bind(filter.year)
        .bind(filter.month)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
