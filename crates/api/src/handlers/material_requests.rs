use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{MaterialRequestFilter, MaterialRequestRow, NewMaterialRequest};
use domain::{access, validation, Caller, MaterialRequestStatus};

use super::sites::MSG_SITE_NOT_FOUND;
use super::{parse_opt, AppState};
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

const MSG_REQUEST_NOT_FOUND: &str = "자재 요청을 찾을 수 없습니다";

#[derive(Deserialize)]
pub struct ListMaterialRequestsQuery {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateMaterialRequestDto {
    pub site_id: Uuid,
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub needed_by: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Workers see their own requests; managers see everything in scope.
pub async fn list(
    ApiQuery(query): ApiQuery<ListMaterialRequestsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<MaterialRequestRow>> {
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };
    let status =
        parse_opt::<MaterialRequestStatus>(query.status.as_deref(), "올바르지 않은 상태값입니다")?;

    let filter = MaterialRequestFilter {
        organization_id,
        site_id: query.site_id,
        requested_by: (!caller.is_manager()).then_some(caller.profile_id),
        status: status.map(|s| s.to_string()),
        limit: validation::page_limit(query.limit)?,
    };
    Ok(ok(state.store.list_material_requests(&filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateMaterialRequestDto>,
) -> CreatedResult<MaterialRequestRow> {
    let site = state
        .store
        .get_site(payload.site_id)
        .await
        .or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_site_access(&caller, site.organization_id, site.id)?;

    let new = NewMaterialRequest {
        organization_id: site.organization_id,
        site_id: site.id,
        requested_by: caller.profile_id,
        material_name: validation::required_text(&payload.material_name, "자재명")?,
        quantity: validation::quantity(payload.quantity)?,
        unit: validation::required_text(&payload.unit, "단위")?,
        needed_by: payload.needed_by,
        note: payload.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    };
    let row = state.store.create_material_request(&new).await?;

    info!(request_id = %row.id, site_id = %row.site_id, "material request created");
    state.publish("material_requests", ChangeAction::Insert, row.id, Some(row.organization_id));
    Ok(created(row))
}

async fn change_status(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    to: MaterialRequestStatus,
) -> ApiResult<MaterialRequestRow> {
    access::require_manager(caller)?;
    let request = state
        .store
        .get_material_request(id)
        .await
        .or_not_found(MSG_REQUEST_NOT_FOUND)?;
    access::assert_org_access(caller, Some(request.organization_id))?;

    let current = request
        .status
        .parse::<MaterialRequestStatus>()
        .map_err(|e| ApiError::internal(format!("material request {id}: {e}")))?;
    let next = current.transition(to)?;

    let row = state
        .store
        .set_material_request_status(id, next.as_str())
        .await
        .or_not_found(MSG_REQUEST_NOT_FOUND)?;

    info!(request_id = %id, from = %current, to = %next, "material request status changed");
    state.publish("material_requests", ChangeAction::Update, id, Some(row.organization_id));
    Ok(ok(row))
}

pub async fn approve(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<MaterialRequestRow> {
    change_status(&state, &caller, id, MaterialRequestStatus::Approved).await
}

pub async fn reject(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<MaterialRequestRow> {
    change_status(&state, &caller, id, MaterialRequestStatus::Rejected).await
}

pub async fn deliver(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<MaterialRequestRow> {
    change_status(&state, &caller, id, MaterialRequestStatus::Delivered).await
}
