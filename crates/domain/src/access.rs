//! Organization / site access guard.
//!
//! One rule covers every admin action: when the caller's profile is
//! marked restricted, any operation on another organization's rows is
//! rejected (detail, update, delete) or silently scoped away (list).
//! Unrestricted callers operate unscoped.
//!
//! Handlers must run the guard *before* issuing any mutating query.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::MSG_NO_ORGANIZATION;
use crate::{DomainError, Role};

/// The authenticated profile on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub profile_id: Uuid,
    pub role: Role,
    pub organization_id: Option<Uuid>,
    /// Assigned site; only meaningful for workers and site managers.
    pub site_id: Option<Uuid>,
    /// Organization-restricted: may only see rows of `organization_id`.
    pub restricted: bool,
}

/// Row filter applied to list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgScope {
    All,
    Organization(Uuid),
}

impl OrgScope {
    /// The organization to filter on, if any.
    pub fn organization_id(&self) -> Option<Uuid> {
        match self {
            Self::All => None,
            Self::Organization(id) => Some(*id),
        }
    }

    /// Whether a row owned by `org` is visible under this scope.
    pub fn allows(&self, org: Option<Uuid>) -> bool {
        match self {
            Self::All => true,
            Self::Organization(id) => org == Some(*id),
        }
    }

    /// Combine the scope with an organization filter from the request.
    ///
    /// `None` means nothing is visible (a restricted caller asked for a
    /// foreign organization); `Some(filter)` is the filter to query with.
    pub fn narrow(&self, requested: Option<Uuid>) -> Option<Option<Uuid>> {
        match (self, requested) {
            (Self::All, requested) => Some(requested),
            (Self::Organization(own), None) => Some(Some(*own)),
            (Self::Organization(own), Some(req)) if req == *own => Some(Some(*own)),
            (Self::Organization(_), Some(_)) => None,
        }
    }
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

/// Admin gate in front of every dashboard action.
pub fn require_admin(caller: &Caller) -> Result<(), DomainError> {
    require_role(caller, &[Role::Admin, Role::SystemAdmin])
}

pub fn require_system_admin(caller: &Caller) -> Result<(), DomainError> {
    require_role(caller, &[Role::SystemAdmin])
}

/// Manager gate for approvals (site manager, customer manager, admins).
pub fn require_manager(caller: &Caller) -> Result<(), DomainError> {
    if caller.is_manager() {
        Ok(())
    } else {
        deny(caller, "manager role required")
    }
}

pub fn require_role(caller: &Caller, allowed: &[Role]) -> Result<(), DomainError> {
    if allowed.contains(&caller.role) {
        Ok(())
    } else {
        deny(caller, "role not allowed")
    }
}

/// The caller's restricted organization.
///
/// `Ok(None)` for unrestricted callers.  A restricted profile without an
/// organization can see nothing and is rejected outright.
pub fn require_restricted_org_id(caller: &Caller) -> Result<Option<Uuid>, DomainError> {
    if !caller.restricted {
        return Ok(None);
    }
    match caller.organization_id {
        Some(org) => Ok(Some(org)),
        None => {
            warn!(profile_id = %caller.profile_id, "restricted profile has no organization");
            Err(DomainError::Forbidden(MSG_NO_ORGANIZATION.to_string()))
        }
    }
}

/// Scope for list queries issued on behalf of `caller`.
pub fn org_scope(caller: &Caller) -> Result<OrgScope, DomainError> {
    Ok(match require_restricted_org_id(caller)? {
        Some(org) => OrgScope::Organization(org),
        None => OrgScope::All,
    })
}

/// Reject when a restricted caller targets a row outside its organization.
///
/// A target without any organization is treated as foreign.
pub fn assert_org_access(caller: &Caller, target_org: Option<Uuid>) -> Result<(), DomainError> {
    match require_restricted_org_id(caller)? {
        None => Ok(()),
        Some(own) if target_org == Some(own) => Ok(()),
        Some(_) => deny(caller, "target belongs to another organization"),
    }
}

/// Organization check plus the site assignment check for workers.
pub fn assert_site_access(
    caller: &Caller,
    site_org: Uuid,
    site_id: Uuid,
) -> Result<(), DomainError> {
    assert_org_access(caller, Some(site_org))?;
    if caller.is_manager() {
        return Ok(());
    }
    if caller.site_id == Some(site_id) {
        Ok(())
    } else {
        deny(caller, "worker is not assigned to this site")
    }
}

fn deny<T>(caller: &Caller, reason: &'static str) -> Result<T, DomainError> {
    warn!(
        profile_id = %caller.profile_id,
        role = %caller.role,
        restricted = caller.restricted,
        reason,
        "access denied"
    );
    Err(DomainError::forbidden())
}
