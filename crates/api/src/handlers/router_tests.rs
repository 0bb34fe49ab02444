//! End-to-end router tests against the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use db::memory::MemoryStore;
use db::models::{
    NewDailyReport, NewDocument, NewMaterialRequest, NewOrganization, NewProfile,
    NewSalarySetting, NewSite, NewWorkRecord, ProfileUpdate,
};
use db::Store;

use super::{router, AppState};
use crate::auth::JwtKeys;
use crate::feed::ChangeFeed;

struct Fixture {
    store: Arc<MemoryStore>,
    state: AppState,
    app: Router,
    org_a: Uuid,
    org_b: Uuid,
    site_a: Uuid,
    site_b: Uuid,
    /// Restricted admin of organization A.
    admin_a: Uuid,
    /// Unrestricted system admin.
    root: Uuid,
    /// Worker assigned to site A.
    worker_a: Uuid,
    /// Worker assigned to site B.
    worker_b: Uuid,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn profile(
    store: &MemoryStore,
    email: &str,
    role: &str,
    org: Option<Uuid>,
    site: Option<Uuid>,
    restricted: bool,
) -> Uuid {
    store
        .create_profile(&NewProfile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: email.split('@').next().unwrap().to_string(),
            role: role.to_string(),
            organization_id: org,
            site_id: site,
            restricted,
        })
        .await
        .unwrap()
        .id
}

async fn site(store: &MemoryStore, org: Uuid, name: &str) -> Uuid {
    store
        .create_site(&NewSite {
            organization_id: org,
            name: name.to_string(),
            address: String::new(),
            status: "active".to_string(),
            start_date: date(2025, 1, 1),
            end_date: None,
        })
        .await
        .unwrap()
        .id
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let org_a = store
        .create_organization(&NewOrganization { name: "A건설".into(), business_number: None })
        .await
        .unwrap()
        .id;
    let org_b = store
        .create_organization(&NewOrganization { name: "B건설".into(), business_number: None })
        .await
        .unwrap()
        .id;
    let site_a = site(&store, org_a, "A현장").await;
    let site_b = site(&store, org_b, "B현장").await;
    let admin_a = profile(&store, "admin-a@example.com", "admin", Some(org_a), None, true).await;
    let root = profile(&store, "root@example.com", "system_admin", None, None, false).await;
    let worker_a =
        profile(&store, "worker-a@example.com", "worker", Some(org_a), Some(site_a), false).await;
    let worker_b =
        profile(&store, "worker-b@example.com", "worker", Some(org_b), Some(site_b), false).await;

    let state = AppState::new(
        store.clone(),
        JwtKeys::from_secret(b"router-test-secret"),
        ChangeFeed::new(16),
    );
    let app = router(state.clone());
    Fixture { store, state, app, org_a, org_b, site_a, site_b, admin_a, root, worker_a, worker_b }
}

impl Fixture {
    fn token(&self, profile_id: Uuid) -> String {
        self.state.keys.issue(profile_id, 300).unwrap()
    }

    async fn raw(
        &self,
        method: Method,
        uri: &str,
        as_profile: Option<Uuid>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(id) = as_profile {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", self.token(id)));
        }
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        self.app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        as_profile: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let res = self.raw(method, uri, as_profile, body).await;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn error_of(body: &Value) -> &str {
    assert_eq!(body["success"], json!(false));
    body["error"].as_str().unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let f = fixture().await;
    let (status, body) = f.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let f = fixture().await;
    let (status, body) = f.call(Method::GET, "/api/v1/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&body), "인증이 필요합니다");

    let req = Request::get("/api/v1/me")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let res = f.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_subject_is_401_and_inactive_is_403() {
    let f = fixture().await;
    let (status, _) = f.call(Method::GET, "/api/v1/me", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let worker = f.store.get_profile(f.worker_a).await.unwrap();
    f.store
        .update_profile(
            f.worker_a,
            &ProfileUpdate {
                full_name: worker.full_name,
                role: worker.role,
                organization_id: worker.organization_id,
                site_id: worker.site_id,
                restricted: worker.restricted,
                active: false,
            },
        )
        .await
        .unwrap();
    let (status, body) = f.call(Method::GET, "/api/v1/me", Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_of(&body), "비활성화된 계정입니다");
}

#[tokio::test]
async fn restricted_admin_cannot_touch_foreign_site() {
    let f = fixture().await;
    let uri = format!("/api/v1/sites/{}", f.site_b);
    let before = f.store.mutation_count();

    let (status, body) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_of(&body), "권한이 없습니다");

    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "name": "탈취" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = f.call(Method::DELETE, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
    assert_eq!(f.store.get_site(f.site_b).await.unwrap().name, "B현장");
}

#[tokio::test]
async fn unrestricted_admin_operates_across_organizations() {
    let f = fixture().await;
    let uri = format!("/api/v1/sites/{}", f.site_b);

    let (status, body) = f
        .call(Method::PUT, &uri, Some(f.root), Some(json!({ "name": "B현장 2공구" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("B현장 2공구"));

    let (status, body) = f.call(Method::DELETE, &uri, Some(f.root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(f.site_b));
    assert!(f.store.mutations().contains(&"delete_site"));
}

#[tokio::test]
async fn lists_are_silently_scoped_for_restricted_admins() {
    let f = fixture().await;

    let (status, body) = f.call(Method::GET, "/api/v1/sites", Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let sites = body["data"].as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["id"], json!(f.site_a));

    let uri = format!("/api/v1/sites?organization_id={}", f.org_b);
    let (status, body) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (_, body) = f.call(Method::GET, "/api/v1/sites", Some(f.root), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = f.call(Method::GET, "/api/v1/organizations", Some(f.admin_a), None).await;
    let orgs = body["data"].as_array().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0]["id"], json!(f.org_a));
}

#[tokio::test]
async fn restricted_admin_creates_sites_in_own_organization_only() {
    let f = fixture().await;

    let (status, body) = f
        .call(
            Method::POST,
            "/api/v1/sites",
            Some(f.admin_a),
            Some(json!({ "name": "신규현장", "start_date": "2025-03-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["organization_id"], json!(f.org_a));

    let before = f.store.mutation_count();
    let (status, _) = f
        .call(
            Method::POST,
            "/api/v1/sites",
            Some(f.admin_a),
            Some(json!({
                "organization_id": f.org_b,
                "name": "남의현장",
                "start_date": "2025-03-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(f.store.mutation_count(), before);
}

#[tokio::test]
async fn restricted_admin_cannot_move_profile_to_foreign_site() {
    let f = fixture().await;
    let before = f.store.mutation_count();
    let uri = format!("/api/v1/profiles/{}", f.worker_a);

    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "site_id": f.site_b })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "organization_id": f.org_b })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "role": "system_admin" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
}

#[tokio::test]
async fn malformed_json_is_an_envelope_400() {
    let f = fixture().await;
    let req = Request::post("/api/v1/sites")
        .header(header::AUTHORIZATION, format!("Bearer {}", f.token(f.root)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = f.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error_of(&body), "잘못된 요청입니다");

    let (status, body) = f
        .call(
            Method::POST,
            "/api/v1/sites",
            Some(f.root),
            Some(json!({ "organization_id": f.org_a, "name": "  ", "start_date": "2025-03-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "현장명을(를) 입력해 주세요");
}

#[tokio::test]
async fn daily_report_review_flow_notifies_author() {
    let f = fixture().await;

    let (status, body) = f
        .call(
            Method::POST,
            "/api/v1/daily-reports",
            Some(f.worker_a),
            Some(json!({
                "site_id": f.site_a,
                "work_date": "2025-03-03",
                "process_type": "철근",
                "worker_count": 5
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], json!("draft"));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // approving a draft skips a step
    let (status, _) = f
        .call(Method::POST, &format!("/api/v1/daily-reports/{id}/approve"), Some(f.admin_a), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = f
        .call(Method::POST, &format!("/api/v1/daily-reports/{id}/submit"), Some(f.worker_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("submitted"));

    let (status, _) = f
        .call(Method::POST, &format!("/api/v1/daily-reports/{id}/approve"), Some(f.worker_a), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = f
        .call(Method::POST, &format!("/api/v1/daily-reports/{id}/approve"), Some(f.admin_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("approved"));

    let (status, body) = f
        .call(Method::DELETE, &format!("/api/v1/daily-reports/{id}"), Some(f.worker_a), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&body), "승인된 작업일지는 삭제할 수 없습니다");

    let (_, body) = f.call(Method::GET, "/api/v1/notifications", Some(f.worker_a), None).await;
    let notes = body["data"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["kind"], json!("approval"));
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let f = fixture().await;
    let (_, body) = f
        .call(
            Method::POST,
            "/api/v1/daily-reports",
            Some(f.worker_a),
            Some(json!({ "site_id": f.site_a, "work_date": "2025-03-04", "process_type": "타설" })),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    f.call(Method::POST, &format!("/api/v1/daily-reports/{id}/submit"), Some(f.worker_a), None)
        .await;

    let uri = format!("/api/v1/daily-reports/{id}/reject");
    let (status, _) = f.call(Method::POST, &uri, Some(f.admin_a), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = f
        .call(Method::POST, &uri, Some(f.admin_a), Some(json!({ "reason": "사진 누락" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("rejected"));
    assert_eq!(body["data"]["rejection_reason"], json!("사진 누락"));
}

#[tokio::test]
async fn worker_cannot_report_on_unassigned_site() {
    let f = fixture().await;
    let other = site(&f.store, f.org_a, "A현장 2공구").await;
    let before = f.store.mutation_count();
    let (status, _) = f
        .call(
            Method::POST,
            "/api/v1/daily-reports",
            Some(f.worker_a),
            Some(json!({ "site_id": other, "work_date": "2025-03-03", "process_type": "철근" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(f.store.mutation_count(), before);
}

async fn seed_month_of_work(f: &Fixture) {
    f.store
        .create_salary_setting(&NewSalarySetting {
            profile_id: f.worker_a,
            daily_wage: 150_000,
            tax_rate: 3.3,
            effective_from: date(2025, 1, 1),
        })
        .await
        .unwrap();
    for day in [3, 4] {
        f.store
            .create_work_record(&NewWorkRecord {
                organization_id: f.org_a,
                site_id: f.site_a,
                profile_id: f.worker_a,
                work_date: date(2025, 3, day),
                labor_hours: 8.0,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn payroll_snapshot_is_computed_once_per_month() {
    let f = fixture().await;
    seed_month_of_work(&f).await;
    let body = json!({ "profile_id": f.worker_a, "year": 2025, "month": 3 });

    let (status, res) = f
        .call(Method::POST, "/api/v1/payroll/snapshots", Some(f.admin_a), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(res["data"]["man_days"], json!(2.0));
    assert_eq!(res["data"]["gross_pay"], json!(300_000));
    assert_eq!(res["data"]["tax_amount"], json!(9_900));
    assert_eq!(res["data"]["net_pay"], json!(290_100));

    let (status, res) = f
        .call(Method::POST, "/api/v1/payroll/snapshots", Some(f.admin_a), Some(body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&res), "해당 월의 급여 스냅샷이 이미 존재합니다");

    let (_, res) = f.call(Method::GET, "/api/v1/notifications", Some(f.worker_a), None).await;
    assert_eq!(res["data"][0]["kind"], json!("payroll"));
}

#[tokio::test]
async fn worker_previews_own_pay_but_not_others() {
    let f = fixture().await;
    seed_month_of_work(&f).await;

    let (status, res) = f
        .call(Method::GET, "/api/v1/payroll/preview?year=2025&month=3", Some(f.worker_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["total_hours"], json!(16.0));
    assert_eq!(res["data"]["net_pay"], json!(290_100));

    let uri = format!("/api/v1/payroll/preview?profile_id={}&year=2025&month=3", f.admin_a);
    let (status, _) = f.call(Method::GET, &uri, Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn payroll_export_is_csv() {
    let f = fixture().await;
    seed_month_of_work(&f).await;
    f.call(
        Method::POST,
        "/api/v1/payroll/snapshots",
        Some(f.root),
        Some(json!({ "profile_id": f.worker_a, "year": 2025, "month": 3 })),
    )
    .await;

    let res = f
        .raw(Method::GET, "/api/v1/payroll/snapshots/export?year=2025&month=3", Some(f.admin_a), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert!(res.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("payroll-2025-03.csv"));

    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    assert!(lines.next().unwrap().starts_with("profile_id,full_name,year,month"));
    let row = lines.next().unwrap();
    assert!(row.contains("worker-a"));
    assert!(row.contains("290100"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn notifications_are_private_to_their_recipient() {
    let f = fixture().await;
    let (status, res) = f
        .call(
            Method::POST,
            "/api/v1/notifications",
            Some(f.admin_a),
            Some(json!({ "site_id": f.site_a, "title": "안전교육 안내" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let sent = res["data"].as_array().unwrap();
    assert_eq!(sent.len(), 1);
    let id = sent[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/notifications/{id}/read");
    let (status, _) = f.call(Method::POST, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, res) = f.call(Method::POST, &uri, Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(res["data"]["read_at"].is_string());

    let (status, res) = f
        .call(Method::POST, "/api/v1/notifications", Some(f.admin_a), Some(json!({ "title": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&res), "수신자 또는 현장을 지정해 주세요");
}

#[tokio::test]
async fn writes_publish_change_events() {
    let f = fixture().await;
    let mut rx = f.state.feed.subscribe();
    let (status, _) = f
        .call(
            Method::POST,
            "/api/v1/sites",
            Some(f.root),
            Some(json!({ "organization_id": f.org_b, "name": "B현장 2공구", "start_date": "2025-05-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.table, "sites");
    assert_eq!(event.organization_id, Some(f.org_b));
}

#[tokio::test]
async fn admins_appointed_by_restricted_admin_stay_restricted() {
    let f = fixture().await;
    let uri = format!("/api/v1/profiles/{}", f.worker_a);

    let (status, body) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("admin"));
    assert_eq!(body["data"]["restricted"], json!(true));

    let (_, body) = f.call(Method::GET, "/api/v1/sites", Some(f.worker_a), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let before = f.store.mutation_count();
    let site_b = format!("/api/v1/sites/{}", f.site_b);
    let (status, _) = f.call(Method::DELETE, &site_b, Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(f.store.mutation_count(), before);
    assert!(f.store.get_site(f.site_b).await.is_ok());
}

#[tokio::test]
async fn restricted_admin_cannot_edit_unrestricted_admin() {
    let f = fixture().await;
    let peer = profile(&f.store, "peer@example.com", "admin", Some(f.org_a), None, false).await;
    let before = f.store.mutation_count();
    let uri = format!("/api/v1/profiles/{peer}");

    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "full_name": "변경" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "role": "worker" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
    assert!(!f.store.get_profile(peer).await.unwrap().restricted);
}

#[tokio::test]
async fn site_end_date_can_be_cleared() {
    let f = fixture().await;
    let uri = format!("/api/v1/sites/{}", f.site_a);

    let (status, body) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "end_date": "2025-12-31" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["end_date"], json!("2025-12-31"));

    let (_, body) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "name": "A현장 본관" })))
        .await;
    assert_eq!(body["data"]["end_date"], json!("2025-12-31"));

    let (status, body) = f
        .call(Method::PUT, &uri, Some(f.admin_a), Some(json!({ "clear_end_date": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["end_date"].is_null());
}

async fn document(f: &Fixture, org: Uuid, owner: Uuid, category: &str, path: &str) -> Uuid {
    f.store
        .create_document(&NewDocument {
            organization_id: org,
            site_id: None,
            owner_id: owner,
            title: path.to_string(),
            category: category.to_string(),
            storage_path: path.to_string(),
            mime_type: "application/pdf".to_string(),
            file_size: 1024,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn foreign_documents_are_off_limits() {
    let f = fixture().await;
    let foreign = document(&f, f.org_b, f.worker_b, "shared", "b/도면.pdf").await;
    let before = f.store.mutation_count();
    let uri = format!("/api/v1/documents/{foreign}");

    let (status, _) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.call(Method::DELETE, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
    assert!(f.store.get_document(foreign).await.is_ok());

    let (status, _) = f.call(Method::GET, &uri, Some(f.root), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn personal_documents_are_visible_to_owner_and_admins() {
    let f = fixture().await;
    let peer = profile(&f.store, "peer@example.com", "worker", Some(f.org_a), Some(f.site_a), false).await;
    let personal = document(&f, f.org_a, f.worker_a, "personal", "a/신분증.jpg").await;
    let shared = document(&f, f.org_a, f.worker_a, "shared", "a/공지.pdf").await;
    let before = f.store.mutation_count();
    let uri = format!("/api/v1/documents/{personal}");

    let (status, _) = f.call(Method::GET, &uri, Some(peer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.call(Method::DELETE, &uri, Some(peer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(f.store.mutation_count(), before);

    let (_, body) = f.call(Method::GET, "/api/v1/documents", Some(peer), None).await;
    let ids: Vec<_> = body["data"].as_array().unwrap().iter().map(|d| d["id"].clone()).collect();
    assert_eq!(ids, vec![json!(shared)]);

    let (status, _) = f.call(Method::GET, &uri, Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn foreign_material_requests_cannot_be_reviewed() {
    let f = fixture().await;
    let id = f
        .store
        .create_material_request(&NewMaterialRequest {
            organization_id: f.org_b,
            site_id: f.site_b,
            requested_by: f.worker_b,
            material_name: "철근 D13".to_string(),
            quantity: 2.5,
            unit: "톤".to_string(),
            needed_by: None,
            note: None,
        })
        .await
        .unwrap()
        .id;
    let before = f.store.mutation_count();

    for action in ["approve", "reject", "deliver"] {
        let uri = format!("/api/v1/material-requests/{id}/{action}");
        let (status, _) = f.call(Method::POST, &uri, Some(f.admin_a), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{action}");
    }
    assert_eq!(f.store.mutation_count(), before);
    assert_eq!(f.store.get_material_request(id).await.unwrap().status, "pending");

    // pending -> delivered skips approval
    let uri = format!("/api/v1/material-requests/{id}/deliver");
    let (status, body) = f.call(Method::POST, &uri, Some(f.root), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&body), "허용되지 않는 상태 변경입니다");

    let uri = format!("/api/v1/material-requests/{id}/approve");
    let (status, body) = f.call(Method::POST, &uri, Some(f.root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("approved"));
}

#[tokio::test]
async fn work_records_need_own_site_and_profile() {
    let f = fixture().await;
    let before = f.store.mutation_count();
    let record = |site: Uuid, profile: Uuid| {
        json!({ "site_id": site, "profile_id": profile, "work_date": "2025-03-03", "labor_hours": 8.0 })
    };

    let (status, _) = f
        .call(Method::POST, "/api/v1/work-records", Some(f.admin_a), Some(record(f.site_b, f.worker_a)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f
        .call(Method::POST, "/api/v1/work-records", Some(f.admin_a), Some(record(f.site_a, f.worker_b)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f
        .call(Method::POST, "/api/v1/work-records", Some(f.worker_a), Some(record(f.site_a, f.worker_a)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(f.store.mutation_count(), before);

    let (status, _) = f
        .call(Method::POST, "/api/v1/work-records", Some(f.admin_a), Some(record(f.site_a, f.worker_a)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn work_record_list_honours_limit() {
    let f = fixture().await;
    seed_month_of_work(&f).await;

    let (status, body) = f
        .call(Method::GET, "/api/v1/work-records?limit=1", Some(f.admin_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["work_date"], json!("2025-03-03"));

    let (status, _) = f
        .call(Method::GET, "/api/v1/work-records?limit=0", Some(f.admin_a), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // payroll still sums the whole month
    let (_, body) = f
        .call(Method::GET, "/api/v1/payroll/preview?year=2025&month=3", Some(f.worker_a), None)
        .await;
    assert_eq!(body["data"]["total_hours"], json!(16.0));
}

#[tokio::test]
async fn foreign_daily_reports_are_off_limits() {
    let f = fixture().await;
    let report = f
        .store
        .create_report(&NewDailyReport {
            site_id: f.site_b,
            organization_id: f.org_b,
            author_id: f.worker_b,
            work_date: date(2025, 3, 3),
            process_type: "거푸집".to_string(),
            worker_count: 3,
            description: String::new(),
        })
        .await
        .unwrap();
    f.store.set_report_status(report.id, "submitted", None).await.unwrap();
    let before = f.store.mutation_count();
    let uri = format!("/api/v1/daily-reports/{}", report.id);

    let (status, _) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.call(Method::DELETE, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f
        .call(Method::POST, &format!("{uri}/approve"), Some(f.admin_a), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f
        .call(Method::POST, &format!("{uri}/reject"), Some(f.admin_a), Some(json!({ "reason": "x" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    // another worker in the same organization cannot read it either
    let (status, _) = f.call(Method::GET, &uri, Some(f.worker_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
    assert_eq!(f.store.get_report(report.id).await.unwrap().status, "submitted");
}

#[tokio::test]
async fn foreign_payroll_is_off_limits() {
    let f = fixture().await;
    let before = f.store.mutation_count();

    let (status, _) = f
        .call(
            Method::POST,
            "/api/v1/salary-settings",
            Some(f.admin_a),
            Some(json!({
                "profile_id": f.worker_b,
                "daily_wage": 150_000,
                "tax_rate": 3.3,
                "effective_from": "2025-01-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/salary-settings/{}", f.worker_b);
    let (status, _) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = f
        .call(
            Method::POST,
            "/api/v1/payroll/snapshots",
            Some(f.admin_a),
            Some(json!({ "profile_id": f.worker_b, "year": 2025, "month": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/payroll/preview?profile_id={}&year=2025&month=3", f.worker_b);
    let (status, _) = f.call(Method::GET, &uri, Some(f.admin_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(f.store.mutation_count(), before);
}

#[tokio::test]
async fn salary_setting_wage_is_capped() {
    let f = fixture().await;
    let before = f.store.mutation_count();
    let (status, body) = f
        .call(
            Method::POST,
            "/api/v1/salary-settings",
            Some(f.admin_a),
            Some(json!({
                "profile_id": f.worker_a,
                "daily_wage": 10_000_000_000_000_000_i64,
                "tax_rate": 100.0,
                "effective_from": "2025-01-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "일당은 100000000원을 넘을 수 없습니다");
    assert_eq!(f.store.mutation_count(), before);
}

#[tokio::test]
async fn export_rejects_bad_month_for_any_organization() {
    let f = fixture().await;
    for uri in [
        "/api/v1/payroll/snapshots/export?year=2025&month=13".to_string(),
        format!("/api/v1/payroll/snapshots/export?organization_id={}&year=2025&month=13", f.org_b),
    ] {
        let res = f.raw(Method::GET, &uri, Some(f.admin_a), None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}
