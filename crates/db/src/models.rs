//! Row structs that map 1-to-1 onto database tables, plus the insert /
//! update / filter payloads the repositories accept.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Status and role columns stay `String` here; the `domain` crate owns
//! their meaning.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// organizations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    /// 사업자등록번호
    pub business_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub business_number: Option<String>,
}

// ---------------------------------------------------------------------------
// sites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SiteRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub address: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub organization_id: Uuid,
    pub name: String,
    pub address: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Full replacement of a site's editable columns.
#[derive(Debug, Clone)]
pub struct SiteUpdate {
    pub name: String,
    pub address: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// profiles
// ---------------------------------------------------------------------------

/// A user profile; `id` equals the auth subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub restricted: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub restricted: bool,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub restricted: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// daily_reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyReportRow {
    pub id: Uuid,
    pub site_id: Uuid,
    /// Copied from the site at insert time so scoping needs no join.
    pub organization_id: Uuid,
    pub author_id: Uuid,
    pub work_date: NaiveDate,
    pub process_type: String,
    pub worker_count: i32,
    pub description: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDailyReport {
    pub site_id: Uuid,
    pub organization_id: Uuid,
    pub author_id: Uuid,
    pub work_date: NaiveDate,
    pub process_type: String,
    pub worker_count: i32,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct DailyReportUpdate {
    pub work_date: NaiveDate,
    pub process_type: String,
    pub worker_count: i32,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct DailyReportFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// documents
// ---------------------------------------------------------------------------

/// Document metadata.  The bytes live in the object store at `storage_path`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub site_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub title: String,
    pub category: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub organization_id: Uuid,
    pub site_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub title: String,
    pub category: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub category: Option<String>,
    /// When set, `personal` documents are only returned for this owner.
    pub viewer_id: Option<Uuid>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// material_requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaterialRequestRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub site_id: Uuid,
    pub requested_by: Uuid,
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub needed_by: Option<NaiveDate>,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaterialRequest {
    pub organization_id: Uuid,
    pub site_id: Uuid,
    pub requested_by: Uuid,
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub needed_by: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialRequestFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub requested_by: Option<Uuid>,
    pub status: Option<String>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// work_records
// ---------------------------------------------------------------------------

/// Hours a profile worked at a site on one day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkRecordRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub site_id: Uuid,
    pub profile_id: Uuid,
    pub work_date: NaiveDate,
    pub labor_hours: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWorkRecord {
    pub organization_id: Uuid,
    pub site_id: Uuid,
    pub profile_id: Uuid,
    pub work_date: NaiveDate,
    pub labor_hours: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WorkRecordFilter {
    pub organization_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// `None` returns every matching row; payroll sums a whole month.
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// salary_settings / salary_snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalarySettingRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub effective_from: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSalarySetting {
    pub profile_id: Uuid,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub effective_from: NaiveDate,
}

/// A frozen monthly payslip.  One per `(profile_id, year, month)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalarySnapshotRow {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub total_hours: f64,
    pub man_days: f64,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub gross_pay: i64,
    pub tax_amount: i64,
    pub net_pay: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSalarySnapshot {
    pub organization_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub total_hours: f64,
    pub man_days: f64,
    pub daily_wage: i64,
    pub tax_rate: f64,
    pub gross_pay: i64,
    pub tax_amount: i64,
    pub net_pay: i64,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct SalarySnapshotFilter {
    pub organization_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

// ---------------------------------------------------------------------------
// notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub kind: String,
}
