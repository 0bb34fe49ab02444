use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{
    NewSalarySetting, ProfileRow, SalarySettingRow, SalarySnapshotFilter, SalarySnapshotRow,
};
use domain::{access, validation, Caller, NotificationKind};

use super::notifications::notify;
use super::profiles::MSG_PROFILE_NOT_FOUND;
use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult};
use crate::error::{ApiError, DbResultExt};
use crate::export::payroll_csv;
use crate::feed::ChangeAction;
use crate::payroll::{self as service, PayrollPreview};

const MSG_DUPLICATE_SETTING: &str = "같은 적용일의 급여 설정이 이미 있습니다";

#[derive(Deserialize)]
pub struct CreateSettingDto {
    pub profile_id: Uuid,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub effective_from: NaiveDate,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub profile_id: Option<Uuid>,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct CreateSnapshotDto {
    pub profile_id: Uuid,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct SnapshotsQuery {
    pub organization_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub organization_id: Option<Uuid>,
    pub year: i32,
    pub month: u32,
}

/// Load a profile the caller may see pay data for: itself, or any
/// profile in scope for an admin.
async fn load_payee(state: &AppState, caller: &Caller, id: Uuid) -> Result<ProfileRow, ApiError> {
    let profile = state.store.get_profile(id).await.or_not_found(MSG_PROFILE_NOT_FOUND)?;
    if profile.id != caller.profile_id {
        access::require_admin(caller)?;
        access::assert_org_access(caller, profile.organization_id)?;
    }
    Ok(profile)
}

/// Admin-only variant of [`load_payee`], for writes.
async fn load_payee_for_admin(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<ProfileRow, ApiError> {
    access::require_admin(caller)?;
    let profile = state.store.get_profile(id).await.or_not_found(MSG_PROFILE_NOT_FOUND)?;
    access::assert_org_access(caller, profile.organization_id)?;
    Ok(profile)
}

pub async fn list_settings(
    ApiPath(profile_id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<SalarySettingRow>> {
    let profile = load_payee(&state, &caller, profile_id).await?;
    Ok(ok(state.store.list_salary_settings(profile.id).await?))
}

pub async fn create_setting(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateSettingDto>,
) -> CreatedResult<SalarySettingRow> {
    let profile = load_payee_for_admin(&state, &caller, payload.profile_id).await?;

    let new = NewSalarySetting {
        profile_id: profile.id,
        daily_wage: validation::daily_wage(payload.daily_wage)?,
        tax_rate: validation::tax_rate(payload.tax_rate)?,
        effective_from: payload.effective_from,
    };
    let row = state
        .store
        .create_salary_setting(&new)
        .await
        .or_conflict(MSG_DUPLICATE_SETTING)?;

    info!(profile_id = %profile.id, effective_from = %row.effective_from, "salary setting created");
    state.publish("salary_settings", ChangeAction::Insert, row.id, profile.organization_id);
    Ok(created(row))
}

/// Without `profile_id` the caller previews its own pay.
pub async fn preview(
    ApiQuery(query): ApiQuery<PreviewQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<PayrollPreview> {
    let profile_id = query.profile_id.unwrap_or(caller.profile_id);
    let profile = load_payee(&state, &caller, profile_id).await?;
    let preview = service::preview(state.store.as_ref(), &profile, query.year, query.month).await?;
    Ok(ok(preview))
}

pub async fn create_snapshot(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateSnapshotDto>,
) -> CreatedResult<SalarySnapshotRow> {
    let profile = load_payee_for_admin(&state, &caller, payload.profile_id).await?;
    let row = service::snapshot(
        state.store.as_ref(),
        &profile,
        payload.year,
        payload.month,
        caller.profile_id,
    )
    .await?;

    state.publish("salary_snapshots", ChangeAction::Insert, row.id, row.organization_id);
    notify(
        &state,
        profile.id,
        profile.organization_id,
        "급여 명세",
        format!("{}년 {}월 급여가 확정되었습니다", row.year, row.month),
        NotificationKind::Payroll,
    )
    .await;
    Ok(created(row))
}

pub async fn list_snapshots(
    ApiQuery(query): ApiQuery<SnapshotsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<SalarySnapshotRow>> {
    access::require_admin(&caller)?;
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };
    if let Some(month) = query.month {
        validation::month(month)?;
    }

    let filter = SalarySnapshotFilter {
        organization_id,
        profile_id: query.profile_id,
        year: query.year,
        month: query.month.map(|m| m as i32),
    };
    Ok(ok(state.store.list_salary_snapshots(&filter).await?))
}

/// `text/csv` download; the only non-envelope response besides SSE.
pub async fn export_snapshots(
    ApiQuery(query): ApiQuery<ExportQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Response, ApiError> {
    access::require_admin(&caller)?;
    validation::month(query.month)?;
    let csv = match access::org_scope(&caller)?.narrow(query.organization_id) {
        Some(organization_id) => {
            service::export_month(state.store.as_ref(), organization_id, query.year, query.month)
                .await?
        }
        None => payroll_csv(&[]),
    };
    let disposition = format!(
        "attachment; filename=\"payroll-{}-{:02}.csv\"",
        query.year, query.month
    );

    info!(year = query.year, month = query.month, "payroll exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
