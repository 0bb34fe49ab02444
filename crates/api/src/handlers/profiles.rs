use axum::extract::State;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{ProfileFilter, ProfileRow, ProfileUpdate};
use domain::{access, validation, Role};

use super::sites::MSG_SITE_NOT_FOUND;
use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{ok, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

pub(crate) const MSG_PROFILE_NOT_FOUND: &str = "사용자를 찾을 수 없습니다";

#[derive(Deserialize)]
pub struct ListProfilesQuery {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateProfileDto {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    /// Clears the site assignment; wins over `site_id`.
    #[serde(default)]
    pub unassign_site: bool,
    pub restricted: Option<bool>,
    pub active: Option<bool>,
}

/// The caller's own profile.
pub async fn me(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<ProfileRow> {
    let profile = state
        .store
        .get_profile(caller.profile_id)
        .await
        .or_not_found(MSG_PROFILE_NOT_FOUND)?;
    Ok(ok(profile))
}

pub async fn list(
    ApiQuery(query): ApiQuery<ListProfilesQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<ProfileRow>> {
    access::require_admin(&caller)?;
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };
    let rows = state
        .store
        .list_profiles(&ProfileFilter { organization_id, site_id: query.site_id })
        .await?;
    Ok(ok(rows))
}

/// Anyone may read their own profile; admins may read profiles in scope.
pub async fn get(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<ProfileRow> {
    let profile = state.store.get_profile(id).await.or_not_found(MSG_PROFILE_NOT_FOUND)?;
    if profile.id != caller.profile_id {
        access::require_admin(&caller)?;
        access::assert_org_access(&caller, profile.organization_id)?;
    }
    Ok(ok(profile))
}

/// Reassign role, organization, site or access flags.
///
/// Both the profile's current organization and the organization it ends
/// up in must pass the guard.  Restricted admins cannot flip the
/// restricted flag or edit unrestricted admins, and any admin they
/// appoint is restricted.  Only system admins grant the system admin role.
pub async fn update(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<UpdateProfileDto>,
) -> ApiResult<ProfileRow> {
    access::require_admin(&caller)?;
    let profile = state.store.get_profile(id).await.or_not_found(MSG_PROFILE_NOT_FOUND)?;
    access::assert_org_access(&caller, profile.organization_id)?;

    let organization_id = payload.organization_id.or(profile.organization_id);
    access::assert_org_access(&caller, organization_id)?;

    let current_role = profile
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::internal(format!("profile {id}: {e}")))?;
    if caller.restricted && current_role.is_admin() && !profile.restricted {
        access::require_system_admin(&caller)?;
    }

    let role = match payload.role {
        Some(role) => {
            if role == Role::SystemAdmin {
                access::require_system_admin(&caller)?;
            }
            role
        }
        None => current_role,
    };

    let mut restricted = payload.restricted.unwrap_or(profile.restricted);
    if caller.restricted && restricted != profile.restricted {
        access::require_system_admin(&caller)?;
    }
    // Admins appointed by a restricted admin stay inside its organization.
    if caller.restricted && role.is_admin() {
        restricted = true;
    }

    let site_id = if payload.unassign_site {
        None
    } else if let Some(site_id) = payload.site_id {
        let site = state.store.get_site(site_id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
        access::assert_org_access(&caller, Some(site.organization_id))?;
        if organization_id != Some(site.organization_id) {
            return Err(ApiError::BadRequest(
                "소속 조직의 현장만 배정할 수 있습니다".to_string(),
            ));
        }
        Some(site_id)
    } else {
        profile.site_id
    };

    let full_name = match payload.full_name {
        Some(n) => validation::required_text(&n, "이름")?,
        None => profile.full_name,
    };

    let update = ProfileUpdate {
        full_name,
        role: role.to_string(),
        organization_id,
        site_id,
        restricted,
        active: payload.active.unwrap_or(profile.active),
    };
    let row = state
        .store
        .update_profile(id, &update)
        .await
        .or_not_found(MSG_PROFILE_NOT_FOUND)?;

    info!(profile_id = %id, role = %row.role, "profile updated");
    state.publish("profiles", ChangeAction::Update, id, row.organization_id);
    Ok(ok(row))
}
