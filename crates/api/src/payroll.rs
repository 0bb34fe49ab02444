//! Payroll orchestration shared by the HTTP handlers and the `payroll`
//! CLI command: gather a month of work records and salary settings,
//! compute the breakdown, optionally freeze it as a snapshot.
//!
//! Callers run the access guard first; nothing here checks permissions.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use db::models::{
    NewSalarySnapshot, ProfileFilter, ProfileRow, SalarySnapshotFilter, SalarySnapshotRow,
    WorkRecordFilter,
};
use db::Store;
use domain::payroll::{self, PayrollBreakdown, PayrollInput, SalaryTerms};
use domain::validation;

use crate::error::{ApiError, DbResultExt};
use crate::export::{payroll_csv, PayrollLine};

pub const MSG_SNAPSHOT_EXISTS: &str = "해당 월의 급여 스냅샷이 이미 존재합니다";

#[derive(Debug, Clone, Serialize)]
pub struct PayrollPreview {
    pub profile_id: Uuid,
    pub full_name: String,
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub breakdown: PayrollBreakdown,
}

/// Compute (without persisting) a profile's pay for one month.
#[instrument(skip(store, profile), fields(profile_id = %profile.id))]
pub async fn preview(
    store: &dyn Store,
    profile: &ProfileRow,
    year: i32,
    month: u32,
) -> Result<PayrollPreview, ApiError> {
    validation::month(month)?;
    let (from, to) = payroll::month_bounds(year, month)?;

    let records = store
        .list_work_records(&WorkRecordFilter {
            profile_id: Some(profile.id),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        })
        .await?;
    let total_hours: f64 = records.iter().map(|r| r.labor_hours).sum();

    let settings: Vec<SalaryTerms> = store
        .list_salary_settings(profile.id)
        .await?
        .into_iter()
        .map(|s| SalaryTerms {
            daily_wage: s.daily_wage,
            tax_rate: s.tax_rate,
            effective_from: s.effective_from,
        })
        .collect();
    let terms = payroll::effective_terms(&settings, year, month)?;

    let breakdown = payroll::calculate(PayrollInput {
        total_hours,
        daily_wage: terms.daily_wage,
        tax_rate: terms.tax_rate,
    });

    Ok(PayrollPreview {
        profile_id: profile.id,
        full_name: profile.full_name.clone(),
        year,
        month,
        breakdown,
    })
}

/// Compute and freeze a profile's pay for one month.
///
/// A month can only be frozen once per profile; a second attempt is a 409.
pub async fn snapshot(
    store: &dyn Store,
    profile: &ProfileRow,
    year: i32,
    month: u32,
    created_by: Uuid,
) -> Result<SalarySnapshotRow, ApiError> {
    let preview = preview(store, profile, year, month).await?;
    let b = preview.breakdown;

    let row = store
        .create_salary_snapshot(&NewSalarySnapshot {
            organization_id: profile.organization_id,
            profile_id: profile.id,
            year,
            month: month as i32,
            total_hours: b.total_hours,
            man_days: b.man_days,
            daily_wage: b.daily_wage,
            tax_rate: b.tax_rate,
            gross_pay: b.gross_pay,
            tax_amount: b.tax_amount,
            net_pay: b.net_pay,
            created_by,
        })
        .await
        .or_conflict(MSG_SNAPSHOT_EXISTS)?;

    info!(
        profile_id = %profile.id,
        year,
        month,
        net_pay = row.net_pay,
        "salary snapshot created"
    );
    Ok(row)
}

/// A month's snapshots within `organization_id` (all when `None`),
/// rendered as CSV.
pub async fn export_month(
    store: &dyn Store,
    organization_id: Option<Uuid>,
    year: i32,
    month: u32,
) -> Result<String, ApiError> {
    validation::month(month)?;
    let snapshots = store
        .list_salary_snapshots(&SalarySnapshotFilter {
            organization_id,
            year: Some(year),
            month: Some(month as i32),
            ..Default::default()
        })
        .await?;
    let names: HashMap<Uuid, String> = store
        .list_profiles(&ProfileFilter { organization_id, site_id: None })
        .await?
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let lines: Vec<PayrollLine<'_>> = snapshots
        .iter()
        .map(|s| PayrollLine {
            snapshot: s,
            full_name: names.get(&s.profile_id).map(String::as_str).unwrap_or(""),
        })
        .collect();
    Ok(payroll_csv(&lines))
}
