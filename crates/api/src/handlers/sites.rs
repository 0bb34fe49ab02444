use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{NewSite, SiteFilter, SiteRow, SiteUpdate};
use domain::{access, validation, SiteStatus};

use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult, Deleted};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

pub(crate) const MSG_SITE_NOT_FOUND: &str = "현장을 찾을 수 없습니다";
const MSG_DUPLICATE_NAME: &str = "같은 이름의 현장이 이미 있습니다";

#[derive(Deserialize)]
pub struct ListSitesQuery {
    pub organization_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateSiteDto {
    /// Defaults to the caller's organization for restricted admins.
    pub organization_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub status: Option<SiteStatus>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct UpdateSiteDto {
    pub name: Option<String>,
    pub address: Option<String>,
    pub status: Option<SiteStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Clears the end date; wins over `end_date`.
    #[serde(default)]
    pub clear_end_date: bool,
}

/// Workers see their assigned site; everyone else sees their scope.
pub async fn list(
    ApiQuery(query): ApiQuery<ListSitesQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<SiteRow>> {
    let scope = access::org_scope(&caller)?;
    let Some(organization_id) = scope.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };

    let site_id = if caller.is_manager() {
        None
    } else {
        match caller.site_id {
            Some(site) => Some(site),
            None => return Ok(ok(Vec::new())),
        }
    };

    let rows = state
        .store
        .list_sites(&SiteFilter { organization_id, site_id })
        .await?;
    Ok(ok(rows))
}

pub async fn get(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<SiteRow> {
    let site = state.store.get_site(id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_site_access(&caller, site.organization_id, site.id)?;
    Ok(ok(site))
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateSiteDto>,
) -> CreatedResult<SiteRow> {
    access::require_admin(&caller)?;
    let organization_id = payload
        .organization_id
        .or(access::require_restricted_org_id(&caller)?)
        .ok_or_else(|| ApiError::BadRequest("조직을 선택해 주세요".to_string()))?;
    access::assert_org_access(&caller, Some(organization_id))?;

    let name = validation::required_text(&payload.name, "현장명")?;
    validation::date_range(payload.start_date, payload.end_date)?;
    state
        .store
        .get_organization(organization_id)
        .await
        .or_not_found("조직을 찾을 수 없습니다")?;

    let row = state
        .store
        .create_site(&NewSite {
            organization_id,
            name,
            address: payload.address.trim().to_string(),
            status: payload.status.unwrap_or(SiteStatus::Active).to_string(),
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await
        .or_conflict(MSG_DUPLICATE_NAME)?;

    info!(site_id = %row.id, %organization_id, "site created");
    state.publish("sites", ChangeAction::Insert, row.id, Some(organization_id));
    Ok(created(row))
}

pub async fn update(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<UpdateSiteDto>,
) -> ApiResult<SiteRow> {
    access::require_admin(&caller)?;
    let site = state.store.get_site(id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(site.organization_id))?;

    let name = match payload.name {
        Some(n) => validation::required_text(&n, "현장명")?,
        None => site.name,
    };
    let start_date = payload.start_date.unwrap_or(site.start_date);
    let end_date = if payload.clear_end_date {
        None
    } else {
        payload.end_date.or(site.end_date)
    };
    validation::date_range(start_date, end_date)?;

    let update = SiteUpdate {
        name,
        address: payload.address.map(|a| a.trim().to_string()).unwrap_or(site.address),
        status: payload.status.map(|s| s.to_string()).unwrap_or(site.status),
        start_date,
        end_date,
    };
    let row = state
        .store
        .update_site(id, &update)
        .await
        .or_conflict(MSG_DUPLICATE_NAME)?;

    state.publish("sites", ChangeAction::Update, id, Some(row.organization_id));
    Ok(ok(row))
}

pub async fn delete(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Deleted> {
    access::require_admin(&caller)?;
    let site = state.store.get_site(id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(site.organization_id))?;

    state.store.delete_site(id).await.or_not_found(MSG_SITE_NOT_FOUND)?;

    info!(site_id = %id, "site deleted");
    state.publish("sites", ChangeAction::Delete, id, Some(site.organization_id));
    Ok(ok(Deleted { id }))
}
