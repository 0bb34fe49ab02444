//! The `Store` trait — every persistence call the HTTP layer makes.
//!
//! Handlers hold an `Arc<dyn Store>` so tests can swap Postgres for
//! [`crate::memory::MemoryStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::*;
use crate::repository::{
    daily_reports, documents, material_requests, notifications, organizations, profiles, salary,
    sites, work_records,
};
use crate::{DbError, DbPool};

#[async_trait]
pub trait Store: Send + Sync {
    // organizations
    async fn create_organization(&self, new: &NewOrganization) -> Result<OrganizationRow, DbError>;
    async fn get_organization(&self, id: Uuid) -> Result<OrganizationRow, DbError>;
    async fn list_organizations(&self, only: Option<Uuid>) -> Result<Vec<OrganizationRow>, DbError>;

    // sites
    async fn create_site(&self, new: &NewSite) -> Result<SiteRow, DbError>;
    async fn get_site(&self, id: Uuid) -> Result<SiteRow, DbError>;
    async fn list_sites(&self, filter: &SiteFilter) -> Result<Vec<SiteRow>, DbError>;
    async fn update_site(&self, id: Uuid, update: &SiteUpdate) -> Result<SiteRow, DbError>;
    async fn delete_site(&self, id: Uuid) -> Result<(), DbError>;

    // profiles
    async fn create_profile(&self, new: &NewProfile) -> Result<ProfileRow, DbError>;
    async fn get_profile(&self, id: Uuid) -> Result<ProfileRow, DbError>;
    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>, DbError>;
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<ProfileRow, DbError>;

    // daily_reports
    async fn create_report(&self, new: &NewDailyReport) -> Result<DailyReportRow, DbError>;
    async fn get_report(&self, id: Uuid) -> Result<DailyReportRow, DbError>;
    async fn list_reports(&self, filter: &DailyReportFilter) -> Result<Vec<DailyReportRow>, DbError>;
    async fn update_report(
        &self,
        id: Uuid,
        update: &DailyReportUpdate,
    ) -> Result<DailyReportRow, DbError>;
    async fn set_report_status(
        &self,
        id: Uuid,
        status: &str,
        rejection_reason: Option<&str>,
    ) -> Result<DailyReportRow, DbError>;
    async fn delete_report(&self, id: Uuid) -> Result<(), DbError>;

    // documents
    async fn create_document(&self, new: &NewDocument) -> Result<DocumentRow, DbError>;
    async fn get_document(&self, id: Uuid) -> Result<DocumentRow, DbError>;
    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRow>, DbError>;
    async fn delete_document(&self, id: Uuid) -> Result<(), DbError>;

    // material_requests
    async fn create_material_request(
        &self,
        new: &NewMaterialRequest,
    ) -> Result<MaterialRequestRow, DbError>;
    async fn get_material_request(&self, id: Uuid) -> Result<MaterialRequestRow, DbError>;
    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> Result<Vec<MaterialRequestRow>, DbError>;
    async fn set_material_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<MaterialRequestRow, DbError>;

    // work_records
    async fn create_work_record(&self, new: &NewWorkRecord) -> Result<WorkRecordRow, DbError>;
    async fn list_work_records(&self, filter: &WorkRecordFilter) -> Result<Vec<WorkRecordRow>, DbError>;

    // salary
    async fn create_salary_setting(&self, new: &NewSalarySetting) -> Result<SalarySettingRow, DbError>;
    async fn list_salary_settings(&self, profile_id: Uuid) -> Result<Vec<SalarySettingRow>, DbError>;
    async fn create_salary_snapshot(
        &self,
        new: &NewSalarySnapshot,
    ) -> Result<SalarySnapshotRow, DbError>;
    async fn list_salary_snapshots(
        &self,
        filter: &SalarySnapshotFilter,
    ) -> Result<Vec<SalarySnapshotRow>, DbError>;

    // notifications
    async fn create_notification(&self, new: &NewNotification) -> Result<NotificationRow, DbError>;
    async fn get_notification(&self, id: Uuid) -> Result<NotificationRow, DbError>;
    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<NotificationRow>, DbError>;
    async fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRow, DbError>;
}

/// Postgres-backed store; a thin forwarder to the repository functions.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_organization(&self, new: &NewOrganization) -> Result<OrganizationRow, DbError> {
        organizations::create_organization(&self.pool, new).await
    }

    async fn get_organization(&self, id: Uuid) -> Result<OrganizationRow, DbError> {
        organizations::get_organization(&self.pool, id).await
    }

    async fn list_organizations(&self, only: Option<Uuid>) -> Result<Vec<OrganizationRow>, DbError> {
        organizations::list_organizations(&self.pool, only).await
    }

    async fn create_site(&self, new: &NewSite) -> Result<SiteRow, DbError> {
        sites::create_site(&self.pool, new).await
    }

    async fn get_site(&self, id: Uuid) -> Result<SiteRow, DbError> {
        sites::get_site(&self.pool, id).await
    }

    async fn list_sites(&self, filter: &SiteFilter) -> Result<Vec<SiteRow>, DbError> {
        sites::list_sites(&self.pool, filter).await
    }

    async fn update_site(&self, id: Uuid, update: &SiteUpdate) -> Result<SiteRow, DbError> {
        sites::update_site(&self.pool, id, update).await
    }

    async fn delete_site(&self, id: Uuid) -> Result<(), DbError> {
        sites::delete_site(&self.pool, id).await
    }

    async fn create_profile(&self, new: &NewProfile) -> Result<ProfileRow, DbError> {
        profiles::create_profile(&self.pool, new).await
    }

    async fn get_profile(&self, id: Uuid) -> Result<ProfileRow, DbError> {
        profiles::get_profile(&self.pool, id).await
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>, DbError> {
        profiles::list_profiles(&self.pool, filter).await
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<ProfileRow, DbError> {
        profiles::update_profile(&self.pool, id, update).await
    }

    async fn create_report(&self, new: &NewDailyReport) -> Result<DailyReportRow, DbError> {
        daily_reports::create_report(&self.pool, new).await
    }

    async fn get_report(&self, id: Uuid) -> Result<DailyReportRow, DbError> {
        daily_reports::get_report(&self.pool, id).await
    }

    async fn list_reports(&self, filter: &DailyReportFilter) -> Result<Vec<DailyReportRow>, DbError> {
        daily_reports::list_reports(&self.pool, filter).await
    }

    async fn update_report(
        &self,
        id: Uuid,
        update: &DailyReportUpdate,
    ) -> Result<DailyReportRow, DbError> {
        daily_reports::update_report(&self.pool, id, update).await
    }

    async fn set_report_status(
        &self,
        id: Uuid,
        status: &str,
        rejection_reason: Option<&str>,
    ) -> Result<DailyReportRow, DbError> {
        daily_reports::set_report_status(&self.pool, id, status, rejection_reason).await
    }

    async fn delete_report(&self, id: Uuid) -> Result<(), DbError> {
        daily_reports::delete_report(&self.pool, id).await
    }

    async fn create_document(&self, new: &NewDocument) -> Result<DocumentRow, DbError> {
        documents::create_document(&self.pool, new).await
    }

    async fn get_document(&self, id: Uuid) -> Result<DocumentRow, DbError> {
        documents::get_document(&self.pool, id).await
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRow>, DbError> {
        documents::list_documents(&self.pool, filter).await
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), DbError> {
        documents::delete_document(&self.pool, id).await
    }

    async fn create_material_request(
        &self,
        new: &NewMaterialRequest,
    ) -> Result<MaterialRequestRow, DbError> {
        material_requests::create_material_request(&self.pool, new).await
    }

    async fn get_material_request(&self, id: Uuid) -> Result<MaterialRequestRow, DbError> {
        material_requests::get_material_request(&self.pool, id).await
    }

    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> Result<Vec<MaterialRequestRow>, DbError> {
        material_requests::list_material_requests(&self.pool, filter).await
    }

    async fn set_material_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<MaterialRequestRow, DbError> {
        material_requests::set_material_request_status(&self.pool, id, status).await
    }

    async fn create_work_record(&self, new: &NewWorkRecord) -> Result<WorkRecordRow, DbError> {
        work_records::create_work_record(&self.pool, new).await
    }

    async fn list_work_records(&self, filter: &WorkRecordFilter) -> Result<Vec<WorkRecordRow>, DbError> {
        work_records::list_work_records(&self.pool, filter).await
    }

    async fn create_salary_setting(&self, new: &NewSalarySetting) -> Result<SalarySettingRow, DbError> {
        salary::create_salary_setting(&self.pool, new).await
    }

    async fn list_salary_settings(&self, profile_id: Uuid) -> Result<Vec<SalarySettingRow>, DbError> {
        salary::list_salary_settings(&self.pool, profile_id).await
    }

    async fn create_salary_snapshot(
        &self,
        new: &NewSalarySnapshot,
    ) -> Result<SalarySnapshotRow, DbError> {
        salary::create_salary_snapshot(&self.pool, new).await
    }

    async fn list_salary_snapshots(
        &self,
        filter: &SalarySnapshotFilter,
    ) -> Result<Vec<SalarySnapshotRow>, DbError> {
        salary::list_salary_snapshots(&self.pool, filter).await
    }

    async fn create_notification(&self, new: &NewNotification) -> Result<NotificationRow, DbError> {
        notifications::create_notification(&self.pool, new).await
    }

    async fn get_notification(&self, id: Uuid) -> Result<NotificationRow, DbError> {
        notifications::get_notification(&self.pool, id).await
    }

    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<NotificationRow>, DbError> {
        notifications::list_notifications(&self.pool, recipient_id, unread_only, limit).await
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRow, DbError> {
        notifications::mark_notification_read(&self.pool, id).await
    }
}
