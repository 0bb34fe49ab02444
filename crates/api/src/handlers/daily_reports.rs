use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{DailyReportFilter, DailyReportRow, DailyReportUpdate, NewDailyReport};
use domain::{access, validation, DomainError, NotificationKind, ReportStatus};

use super::notifications::notify;
use super::sites::MSG_SITE_NOT_FOUND;
use super::{parse_opt, AppState};
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult, Deleted};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

const MSG_REPORT_NOT_FOUND: &str = "작업일지를 찾을 수 없습니다";
const MSG_DUPLICATE_DATE: &str = "해당 날짜의 작업일지가 이미 있습니다";
const MSG_NOT_EDITABLE: &str = "작성 중이거나 반려된 작업일지만 수정할 수 있습니다";
const MSG_APPROVED_DELETE: &str = "승인된 작업일지는 삭제할 수 없습니다";

#[derive(Deserialize)]
pub struct ListReportsQuery {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateReportDto {
    pub site_id: Uuid,
    pub work_date: NaiveDate,
    pub process_type: String,
    #[serde(default)]
    pub worker_count: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateReportDto {
    pub work_date: Option<NaiveDate>,
    pub process_type: Option<String>,
    pub worker_count: Option<i32>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct RejectDto {
    #[serde(default)]
    pub reason: String,
}

fn current_status(report: &DailyReportRow) -> Result<ReportStatus, ApiError> {
    report
        .status
        .parse::<ReportStatus>()
        .map_err(|e| ApiError::internal(format!("report {}: {e}", report.id)))
}

/// Load a report the caller may read: organization guard, and workers
/// only see their own.
async fn load_visible(
    state: &AppState,
    caller: &domain::Caller,
    id: Uuid,
) -> Result<DailyReportRow, ApiError> {
    let report = state.store.get_report(id).await.or_not_found(MSG_REPORT_NOT_FOUND)?;
    access::assert_org_access(caller, Some(report.organization_id))?;
    if !caller.is_manager() && report.author_id != caller.profile_id {
        return Err(DomainError::forbidden().into());
    }
    Ok(report)
}

fn require_author(caller: &domain::Caller, report: &DailyReportRow) -> Result<(), ApiError> {
    if report.author_id == caller.profile_id {
        Ok(())
    } else {
        Err(DomainError::forbidden().into())
    }
}

pub async fn list(
    ApiQuery(query): ApiQuery<ListReportsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<DailyReportRow>> {
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };
    let status = parse_opt::<ReportStatus>(query.status.as_deref(), "올바르지 않은 상태값입니다")?;

    let filter = DailyReportFilter {
        organization_id,
        site_id: query.site_id,
        author_id: (!caller.is_manager()).then_some(caller.profile_id),
        status: status.map(|s| s.to_string()),
        from: query.from,
        to: query.to,
        limit: validation::page_limit(query.limit)?,
    };
    Ok(ok(state.store.list_reports(&filter).await?))
}

pub async fn get(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<DailyReportRow> {
    Ok(ok(load_visible(&state, &caller, id).await?))
}

/// New reports start as drafts.
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateReportDto>,
) -> CreatedResult<DailyReportRow> {
    let site = state
        .store
        .get_site(payload.site_id)
        .await
        .or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_site_access(&caller, site.organization_id, site.id)?;

    let new = NewDailyReport {
        site_id: site.id,
        organization_id: site.organization_id,
        author_id: caller.profile_id,
        work_date: payload.work_date,
        process_type: validation::required_text(&payload.process_type, "공정")?,
        worker_count: validation::worker_count(payload.worker_count)?,
        description: payload.description.trim().to_string(),
    };
    let row = state.store.create_report(&new).await.or_conflict(MSG_DUPLICATE_DATE)?;

    info!(report_id = %row.id, site_id = %row.site_id, "daily report created");
    state.publish("daily_reports", ChangeAction::Insert, row.id, Some(row.organization_id));
    Ok(created(row))
}

pub async fn update(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<UpdateReportDto>,
) -> ApiResult<DailyReportRow> {
    let report = load_visible(&state, &caller, id).await?;
    require_author(&caller, &report)?;
    if !current_status(&report)?.is_editable() {
        return Err(ApiError::Conflict(MSG_NOT_EDITABLE.to_string()));
    }

    let update = DailyReportUpdate {
        work_date: payload.work_date.unwrap_or(report.work_date),
        process_type: match payload.process_type {
            Some(p) => validation::required_text(&p, "공정")?,
            None => report.process_type,
        },
        worker_count: validation::worker_count(payload.worker_count.unwrap_or(report.worker_count))?,
        description: payload
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(report.description),
    };
    let row = state
        .store
        .update_report(id, &update)
        .await
        .or_conflict(MSG_DUPLICATE_DATE)?;

    state.publish("daily_reports", ChangeAction::Update, id, Some(row.organization_id));
    Ok(ok(row))
}

pub async fn submit(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<DailyReportRow> {
    let report = load_visible(&state, &caller, id).await?;
    require_author(&caller, &report)?;
    let next = current_status(&report)?.transition(ReportStatus::Submitted)?;

    let row = state
        .store
        .set_report_status(id, next.as_str(), None)
        .await
        .or_not_found(MSG_REPORT_NOT_FOUND)?;

    info!(report_id = %id, "daily report submitted");
    state.publish("daily_reports", ChangeAction::Update, id, Some(row.organization_id));
    Ok(ok(row))
}

pub async fn approve(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<DailyReportRow> {
    access::require_manager(&caller)?;
    let report = state.store.get_report(id).await.or_not_found(MSG_REPORT_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(report.organization_id))?;
    let next = current_status(&report)?.transition(ReportStatus::Approved)?;

    let row = state
        .store
        .set_report_status(id, next.as_str(), None)
        .await
        .or_not_found(MSG_REPORT_NOT_FOUND)?;

    info!(report_id = %id, approver = %caller.profile_id, "daily report approved");
    state.publish("daily_reports", ChangeAction::Update, id, Some(row.organization_id));
    notify(
        &state,
        row.author_id,
        Some(row.organization_id),
        "작업일지 승인",
        format!("{} 작업일지가 승인되었습니다", row.work_date),
        NotificationKind::Approval,
    )
    .await;
    Ok(ok(row))
}

/// Send a submitted report back to its author with a reason.
pub async fn reject(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<RejectDto>,
) -> ApiResult<DailyReportRow> {
    access::require_manager(&caller)?;
    let reason = validation::required_text(&payload.reason, "반려 사유")?;
    let report = state.store.get_report(id).await.or_not_found(MSG_REPORT_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(report.organization_id))?;
    let next = current_status(&report)?.transition(ReportStatus::Rejected)?;

    let row = state
        .store
        .set_report_status(id, next.as_str(), Some(reason.as_str()))
        .await
        .or_not_found(MSG_REPORT_NOT_FOUND)?;

    info!(report_id = %id, approver = %caller.profile_id, "daily report rejected");
    state.publish("daily_reports", ChangeAction::Update, id, Some(row.organization_id));
    notify(
        &state,
        row.author_id,
        Some(row.organization_id),
        "작업일지 반려",
        format!("{} 작업일지가 반려되었습니다: {reason}", row.work_date),
        NotificationKind::Approval,
    )
    .await;
    Ok(ok(row))
}

pub async fn delete(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Deleted> {
    let report = state.store.get_report(id).await.or_not_found(MSG_REPORT_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(report.organization_id))?;
    if report.author_id != caller.profile_id {
        access::require_admin(&caller)?;
    }
    if current_status(&report)? == ReportStatus::Approved {
        return Err(ApiError::Conflict(MSG_APPROVED_DELETE.to_string()));
    }

    state.store.delete_report(id).await.or_not_found(MSG_REPORT_NOT_FOUND)?;

    info!(report_id = %id, "daily report deleted");
    state.publish("daily_reports", ChangeAction::Delete, id, Some(report.organization_id));
    Ok(ok(Deleted { id }))
}
