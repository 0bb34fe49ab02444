use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{NewWorkRecord, WorkRecordFilter, WorkRecordRow};
use domain::{access, payroll, validation};

use super::profiles::MSG_PROFILE_NOT_FOUND;
use super::sites::MSG_SITE_NOT_FOUND;
use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiQuery, ApiResult, CreatedResult};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

const MSG_DUPLICATE_DAY: &str = "해당 날짜의 공수가 이미 입력되었습니다";
const MSG_YEAR_MONTH_PAIR: &str = "연도와 월을 함께 지정해 주세요";

#[derive(Deserialize)]
pub struct ListWorkRecordsQuery {
    pub organization_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateWorkRecordDto {
    pub profile_id: Uuid,
    pub site_id: Uuid,
    pub work_date: NaiveDate,
    pub labor_hours: f64,
}

/// Workers only ever see their own records.
pub async fn list(
    ApiQuery(query): ApiQuery<ListWorkRecordsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<WorkRecordRow>> {
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };

    let (from, to) = match (query.year, query.month) {
        (Some(year), Some(month)) => {
            validation::month(month)?;
            let (from, to) = payroll::month_bounds(year, month)?;
            (Some(from), Some(to))
        }
        (None, None) => (None, None),
        _ => return Err(ApiError::BadRequest(MSG_YEAR_MONTH_PAIR.to_string())),
    };

    let profile_id = if caller.is_manager() {
        query.profile_id
    } else {
        Some(caller.profile_id)
    };

    let filter = WorkRecordFilter {
        organization_id,
        site_id: query.site_id,
        profile_id,
        from,
        to,
        limit: Some(validation::page_limit(query.limit)?),
    };
    Ok(ok(state.store.list_work_records(&filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateWorkRecordDto>,
) -> CreatedResult<WorkRecordRow> {
    access::require_manager(&caller)?;
    let site = state
        .store
        .get_site(payload.site_id)
        .await
        .or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_site_access(&caller, site.organization_id, site.id)?;
    let profile = state
        .store
        .get_profile(payload.profile_id)
        .await
        .or_not_found(MSG_PROFILE_NOT_FOUND)?;
    access::assert_org_access(&caller, profile.organization_id)?;

    let new = NewWorkRecord {
        organization_id: site.organization_id,
        site_id: site.id,
        profile_id: profile.id,
        work_date: payload.work_date,
        labor_hours: validation::labor_hours(payload.labor_hours)?,
    };
    let row = state.store.create_work_record(&new).await.or_conflict(MSG_DUPLICATE_DAY)?;

    info!(
        record_id = %row.id,
        profile_id = %row.profile_id,
        hours = row.labor_hours,
        "work record created"
    );
    state.publish("work_records", ChangeAction::Insert, row.id, Some(row.organization_id));
    Ok(created(row))
}
