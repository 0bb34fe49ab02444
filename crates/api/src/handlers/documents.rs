use axum::extract::State;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use db::models::{DocumentFilter, DocumentRow, NewDocument};
use domain::{access, validation, DocumentCategory, DomainError};

use super::sites::MSG_SITE_NOT_FOUND;
use super::{parse_opt, AppState};
use crate::auth::AuthCaller;
use crate::envelope::{created, ok, ApiJson, ApiPath, ApiQuery, ApiResult, CreatedResult, Deleted};
use crate::error::{ApiError, DbResultExt};
use crate::feed::ChangeAction;

const MSG_DOCUMENT_NOT_FOUND: &str = "문서를 찾을 수 없습니다";
const MSG_DUPLICATE_PATH: &str = "이미 등록된 파일입니다";

#[derive(Deserialize)]
pub struct ListDocumentsQuery {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

/// Metadata for a file already uploaded to object storage.
#[derive(Deserialize)]
pub struct CreateDocumentDto {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub title: String,
    pub category: DocumentCategory,
    pub storage_path: String,
    #[serde(default = "default_mime")]
    pub mime_type: String,
    #[serde(default)]
    pub file_size: i64,
}

fn default_mime() -> String {
    "application/octet-stream".to_string()
}

fn is_personal(doc: &DocumentRow) -> bool {
    doc.category == DocumentCategory::Personal.as_str()
}

pub async fn list(
    ApiQuery(query): ApiQuery<ListDocumentsQuery>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<DocumentRow>> {
    let Some(organization_id) = access::org_scope(&caller)?.narrow(query.organization_id) else {
        return Ok(ok(Vec::new()));
    };
    let category =
        parse_opt::<DocumentCategory>(query.category.as_deref(), "올바르지 않은 문서 분류입니다")?;

    let filter = DocumentFilter {
        organization_id,
        site_id: query.site_id,
        category: category.map(|c| c.to_string()),
        viewer_id: (!caller.is_admin()).then_some(caller.profile_id),
        limit: validation::page_limit(query.limit)?,
    };
    Ok(ok(state.store.list_documents(&filter).await?))
}

pub async fn get(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<DocumentRow> {
    let doc = state.store.get_document(id).await.or_not_found(MSG_DOCUMENT_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(doc.organization_id))?;
    if is_personal(&doc) && doc.owner_id != caller.profile_id && !caller.is_admin() {
        return Err(DomainError::forbidden().into());
    }
    Ok(ok(doc))
}

/// The document's organization comes from its site when one is given,
/// else from the request, else from the caller.
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ApiJson(payload): ApiJson<CreateDocumentDto>,
) -> CreatedResult<DocumentRow> {
    let organization_id = match payload.site_id {
        Some(site_id) => {
            let site = state.store.get_site(site_id).await.or_not_found(MSG_SITE_NOT_FOUND)?;
            access::assert_site_access(&caller, site.organization_id, site.id)?;
            site.organization_id
        }
        None => {
            let org = payload
                .organization_id
                .or(caller.organization_id)
                .ok_or_else(|| ApiError::BadRequest("조직을 선택해 주세요".to_string()))?;
            access::assert_org_access(&caller, Some(org))?;
            org
        }
    };
    if payload.file_size < 0 {
        return Err(ApiError::BadRequest("파일 크기가 올바르지 않습니다".to_string()));
    }

    let new = NewDocument {
        organization_id,
        site_id: payload.site_id,
        owner_id: caller.profile_id,
        title: validation::required_text(&payload.title, "제목")?,
        category: payload.category.to_string(),
        storage_path: validation::required_text(&payload.storage_path, "파일 경로")?,
        mime_type: payload.mime_type,
        file_size: payload.file_size,
    };
    let row = state.store.create_document(&new).await.or_conflict(MSG_DUPLICATE_PATH)?;

    info!(document_id = %row.id, category = %row.category, "document registered");
    state.publish("documents", ChangeAction::Insert, row.id, Some(organization_id));
    Ok(created(row))
}

pub async fn delete(
    ApiPath(id): ApiPath<Uuid>,
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Deleted> {
    let doc = state.store.get_document(id).await.or_not_found(MSG_DOCUMENT_NOT_FOUND)?;
    access::assert_org_access(&caller, Some(doc.organization_id))?;
    if doc.owner_id != caller.profile_id {
        access::require_admin(&caller)?;
    }

    state.store.delete_document(id).await.or_not_found(MSG_DOCUMENT_NOT_FOUND)?;

    info!(document_id = %id, "document deleted");
    state.publish("documents", ChangeAction::Delete, id, Some(doc.organization_id));
    Ok(ok(Deleted { id }))
}
