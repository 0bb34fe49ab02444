use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use db::models::{NewOrganization, OrganizationRow};
use domain::{access, validation};

use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiResult, CreatedResult};
use crate::error::DbResultExt;
use crate::feed::ChangeAction;

const MSG_NOT_FOUND: &str = "조직을 찾을 수 없습니다";

#[derive(serde::Deserialize)]
pub struct CreateOrganizationDto {
    pub name: String,
    pub business_number: Option<String>,
}

/// Admins only; a restricted admin sees its own organization.
pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<OrganizationRow>> {
    access::require_admin(&caller)?;
    let only = access::require_restricted_org_id(&caller)?;
    let rows = state.store.list_organizations(only).await?;
    Ok(ok(rows))
}

pub async fn get(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<OrganizationRow> {
    access::require_admin(&caller)?;
    access::assert_org_access(&caller, Some(id))?;
    let row = state.store.get_organization(id).await.or_not_found(MSG_NOT_FOUND)?;
    Ok(ok(row))
}

/// System admins only.
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateOrganizationDto>,
) -> CreatedResult<OrganizationRow> {
    access::require_system_admin(&caller)?;
    let name = validation::required_text(&payload.name, "조직명")?;
    let business_number = payload
        .business_number
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());

    let row = state
        .store
        .create_organization(&NewOrganization { name, business_number })
        .await
        .or_conflict("이미 등록된 조직명입니다")?;

    info!(organization_id = %row.id, "organization created");
    state.publish("organizations", ChangeAction::Insert, row.id, Some(row.id));
    Ok(created(row))
}
