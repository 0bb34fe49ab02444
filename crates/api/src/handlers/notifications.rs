use axum::extract::State;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use db::models::{NewNotification, NotificationRow, ProfileFilter};
use domain::{access, validation, DomainError, NotificationKind};

use super::profiles::MSG_PROFILE_NOT_FOUND;
use super::sites::MSG_SITE_NOT_FOUND;
use super::AppState;
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

const MSG_NOTIFICATION_NOT_FOUND: &str = "알림을 찾을 수 없습니다";
const MSG_TARGET_REQUIRED: &str = "수신자 또는 현장을 지정해 주세요";

#[derive(Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// Exactly one of `recipient_id` / `site_id`.
#[derive(Deserialize)]
pub struct CreateNotificationDto {
    pub recipient_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub kind: Option<NotificationKind>,
}

/// Best-effort notification that follows another write.
///
/// The triggering change has already committed, so a failure here is
/// logged and swallowed.
pub(crate) async fn notify(
    state: &AppState,
    recipient_id: Uuid,
    organization_id: Option<Uuid>,
    title: &str,
    body: String,
    kind: NotificationKind,
) {
    let new = NewNotification {
        recipient_id,
        organization_id,
        title: title.to_string(),
        body,
        kind: kind.to_string(),
    };
    match state.store.create_notification(&new).await {
        Ok(row) => state.publish("notifications", ChangeAction::Insert, row.id, organization_id),
        Err(err) => warn!(%recipient_id, error = %err, "failed to create notification"),
    }
}

/// The caller's own notifications, newest first.
pub async fn list(
    ApiQuery(query): ApiQuery<ListNotificationsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<NotificationRow>> {
    let limit = validation::page_limit(query.limit)?;
    let rows = state
        .store
        .list_notifications(caller.profile_id, query.unread_only, limit)
        .await?;
    Ok(ok(rows))
}

pub async fn mark_read(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<NotificationRow> {
    let notification = state
        .store
        .get_notification(id)
        .await
        .or_not_found(MSG_NOTIFICATION_NOT_FOUND)?;
    if notification.recipient_id != caller.profile_id {
        return Err(DomainError::forbidden().into());
    }

    let row = state
        .store
        .mark_notification_read(id)
        .await
        .or_not_found(MSG_NOTIFICATION_NOT_FOUND)?;
    state.publish("notifications", ChangeAction::Update, id, row.organization_id);
    Ok(ok(row))
}

/// Send to one profile, or to every profile assigned to a site.
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateNotificationDto>,
) -> CreatedResult<Vec<NotificationRow>> {
    access::require_manager(&caller)?;
    let title = validation::required_text(&payload.title, "제목")?;
    let kind = payload.kind.unwrap_or(NotificationKind::Info);

    let (organization_id, recipients) = match (payload.recipient_id, payload.site_id) {
        (Some(recipient_id), None) => {
            let profile = state
                .store
                .get_profile(recipient_id)
                .await
                .or_not_found(MSG_PROFILE_NOT_FOUND)?;
            access::assert_org_access(&caller, profile.organization_id)?;
            (profile.organization_id, vec![profile.id])
        }
        (None, Some(site_id)) => {
            let site = state.store.get_site(site_id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
            access::assert_org_access(&caller, Some(site.organization_id))?;
            let profiles = state
                .store
                .list_profiles(&ProfileFilter {
                    organization_id: Some(site.organization_id),
                    site_id: Some(site.id),
                })
                .await?;
            (
                Some(site.organization_id),
                profiles.into_iter().filter(|p| p.active).map(|p| p.id).collect(),
            )
        }
        _ => return Err(ApiError::BadRequest(MSG_TARGET_REQUIRED.to_string())),
    };

    let mut rows = Vec::with_capacity(recipients.len());
    for recipient_id in recipients {
        let row = state
            .store
            .create_notification(&NewNotification {
                recipient_id,
                organization_id,
                title: title.clone(),
                body: payload.body.trim().to_string(),
                kind: kind.to_string(),
            })
            .await?;
        state.publish("notifications", ChangeAction::Insert, row.id, organization_id);
        rows.push(row);
    }

    info!(sender = %caller.profile_id, count = rows.len(), %kind, "notifications sent");
    Ok(created(rows))
}
