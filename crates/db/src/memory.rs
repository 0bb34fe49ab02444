//! `MemoryStore` — an in-process test double for [`Store`].
//!
//! Rows live in hash maps behind one mutex.  The unique constraints from
//! the migration are enforced so conflict paths can be exercised, and
//! every mutating call is recorded *before* it runs so tests can assert
//! that a guard rejected a request without reaching a write.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::*;
use crate::{DbError, Store};

#[derive(Default)]
struct Tables {
    organizations: HashMap<Uuid, OrganizationRow>,
    sites: HashMap<Uuid, SiteRow>,
    profiles: HashMap<Uuid, ProfileRow>,
    reports: HashMap<Uuid, DailyReportRow>,
    documents: HashMap<Uuid, DocumentRow>,
    material_requests: HashMap<Uuid, MaterialRequestRow>,
    work_records: HashMap<Uuid, WorkRecordRow>,
    salary_settings: HashMap<Uuid, SalarySettingRow>,
    salary_snapshots: HashMap<Uuid, SalarySnapshotRow>,
    notifications: HashMap<Uuid, NotificationRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Names of the mutating calls made so far, in call order.
    mutations: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls received (successful or not).
    pub fn mutation_count(&self) -> usize {
        self.log().len()
    }

    /// Names of the mutating calls received, e.g. `["create_site", "delete_site"]`.
    pub fn mutations(&self) -> Vec<&'static str> {
        self.log().clone()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log(&self) -> MutexGuard<'_, Vec<&'static str>> {
        self.mutations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: &'static str) {
        self.log().push(call);
    }
}

fn conflict(constraint: &str) -> DbError {
    DbError::Conflict(constraint.to_string())
}

fn matches<T: PartialEq>(filter: &Option<T>, value: &T) -> bool {
    filter.as_ref().map_or(true, |f| f == value)
}

fn matches_opt<T: PartialEq>(filter: &Option<T>, value: &Option<T>) -> bool {
    match filter {
        None => true,
        Some(f) => value.as_ref() == Some(f),
    }
}

fn take_limit<T>(mut rows: Vec<T>, limit: i64) -> Vec<T> {
    rows.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    // -----------------------------------------------------------------------
    // organizations
    // -----------------------------------------------------------------------

    async fn create_organization(&self, new: &NewOrganization) -> Result<OrganizationRow, DbError> {
        self.record("create_organization");
        let mut t = self.tables();
        if t.organizations.values().any(|o| o.name == new.name) {
            return Err(conflict("organizations_name_key"));
        }
        let row = OrganizationRow {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            business_number: new.business_number.clone(),
            created_at: Utc::now(),
        };
        t.organizations.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_organization(&self, id: Uuid) -> Result<OrganizationRow, DbError> {
        self.tables().organizations.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_organizations(&self, only: Option<Uuid>) -> Result<Vec<OrganizationRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .organizations
            .values()
            .filter(|o| matches(&only, &o.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // sites
    // -----------------------------------------------------------------------

    async fn create_site(&self, new: &NewSite) -> Result<SiteRow, DbError> {
        self.record("create_site");
        let mut t = self.tables();
        if t.sites
            .values()
            .any(|s| s.organization_id == new.organization_id && s.name == new.name)
        {
            return Err(conflict("sites_organization_name_key"));
        }
        let row = SiteRow {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            name: new.name.clone(),
            address: new.address.clone(),
            status: new.status.clone(),
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Utc::now(),
        };
        t.sites.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_site(&self, id: Uuid) -> Result<SiteRow, DbError> {
        self.tables().sites.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_sites(&self, filter: &SiteFilter) -> Result<Vec<SiteRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .sites
            .values()
            .filter(|s| matches(&filter.organization_id, &s.organization_id))
            .filter(|s| matches(&filter.site_id, &s.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_site(&self, id: Uuid, update: &SiteUpdate) -> Result<SiteRow, DbError> {
        self.record("update_site");
        let mut t = self.tables();
        let org = t.sites.get(&id).map(|s| s.organization_id).ok_or(DbError::NotFound)?;
        if t.sites
            .values()
            .any(|s| s.id != id && s.organization_id == org && s.name == update.name)
        {
            return Err(conflict("sites_organization_name_key"));
        }
        let site = t.sites.get_mut(&id).ok_or(DbError::NotFound)?;
        site.name = update.name.clone();
        site.address = update.address.clone();
        site.status = update.status.clone();
        site.start_date = update.start_date;
        site.end_date = update.end_date;
        Ok(site.clone())
    }

    async fn delete_site(&self, id: Uuid) -> Result<(), DbError> {
        self.record("delete_site");
        self.tables().sites.remove(&id).map(|_| ()).ok_or(DbError::NotFound)
    }

    // -----------------------------------------------------------------------
    // profiles
    // -----------------------------------------------------------------------

    async fn create_profile(&self, new: &NewProfile) -> Result<ProfileRow, DbError> {
        self.record("create_profile");
        let mut t = self.tables();
        if t.profiles.contains_key(&new.id) {
            return Err(conflict("profiles_pkey"));
        }
        if t.profiles.values().any(|p| p.email == new.email) {
            return Err(conflict("profiles_email_key"));
        }
        let row = ProfileRow {
            id: new.id,
            email: new.email.clone(),
            full_name: new.full_name.clone(),
            role: new.role.clone(),
            organization_id: new.organization_id,
            site_id: new.site_id,
            restricted: new.restricted,
            active: true,
            created_at: Utc::now(),
        };
        t.profiles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_profile(&self, id: Uuid) -> Result<ProfileRow, DbError> {
        self.tables().profiles.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .profiles
            .values()
            .filter(|p| matches_opt(&filter.organization_id, &p.organization_id))
            .filter(|p| matches_opt(&filter.site_id, &p.site_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(rows)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<ProfileRow, DbError> {
        self.record("update_profile");
        let mut t = self.tables();
        let profile = t.profiles.get_mut(&id).ok_or(DbError::NotFound)?;
        profile.full_name = update.full_name.clone();
        profile.role = update.role.clone();
        profile.organization_id = update.organization_id;
        profile.site_id = update.site_id;
        profile.restricted = update.restricted;
        profile.active = update.active;
        Ok(profile.clone())
    }

    // -----------------------------------------------------------------------
    // daily_reports
    // -----------------------------------------------------------------------

    async fn create_report(&self, new: &NewDailyReport) -> Result<DailyReportRow, DbError> {
        self.record("create_report");
        let mut t = self.tables();
        if t.reports.values().any(|r| {
            r.site_id == new.site_id && r.author_id == new.author_id && r.work_date == new.work_date
        }) {
            return Err(conflict("daily_reports_site_author_date_key"));
        }
        let now = Utc::now();
        let row = DailyReportRow {
            id: Uuid::new_v4(),
            site_id: new.site_id,
            organization_id: new.organization_id,
            author_id: new.author_id,
            work_date: new.work_date,
            process_type: new.process_type.clone(),
            worker_count: new.worker_count,
            description: new.description.clone(),
            status: "draft".to_string(),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        t.reports.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_report(&self, id: Uuid) -> Result<DailyReportRow, DbError> {
        self.tables().reports.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_reports(&self, filter: &DailyReportFilter) -> Result<Vec<DailyReportRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .reports
            .values()
            .filter(|r| matches(&filter.organization_id, &r.organization_id))
            .filter(|r| matches(&filter.site_id, &r.site_id))
            .filter(|r| matches(&filter.author_id, &r.author_id))
            .filter(|r| matches(&filter.status, &r.status))
            .filter(|r| filter.from.map_or(true, |from| r.work_date >= from))
            .filter(|r| filter.to.map_or(true, |to| r.work_date <= to))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.work_date.cmp(&a.work_date).then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(take_limit(rows, filter.limit))
    }

    async fn update_report(
        &self,
        id: Uuid,
        update: &DailyReportUpdate,
    ) -> Result<DailyReportRow, DbError> {
        self.record("update_report");
        let mut t = self.tables();
        let (site_id, author_id) = t
            .reports
            .get(&id)
            .map(|r| (r.site_id, r.author_id))
            .ok_or(DbError::NotFound)?;
        if t.reports.values().any(|r| {
            r.id != id && r.site_id == site_id && r.author_id == author_id && r.work_date == update.work_date
        }) {
            return Err(conflict("daily_reports_site_author_date_key"));
        }
        let report = t.reports.get_mut(&id).ok_or(DbError::NotFound)?;
        report.work_date = update.work_date;
        report.process_type = update.process_type.clone();
        report.worker_count = update.worker_count;
        report.description = update.description.clone();
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn set_report_status(
        &self,
        id: Uuid,
        status: &str,
        rejection_reason: Option<&str>,
    ) -> Result<DailyReportRow, DbError> {
        self.record("set_report_status");
        let mut t = self.tables();
        let report = t.reports.get_mut(&id).ok_or(DbError::NotFound)?;
        report.status = status.to_string();
        report.rejection_reason = rejection_reason.map(str::to_string);
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn delete_report(&self, id: Uuid) -> Result<(), DbError> {
        self.record("delete_report");
        self.tables().reports.remove(&id).map(|_| ()).ok_or(DbError::NotFound)
    }

    // -----------------------------------------------------------------------
    // documents
    // -----------------------------------------------------------------------

    async fn create_document(&self, new: &NewDocument) -> Result<DocumentRow, DbError> {
        self.record("create_document");
        let mut t = self.tables();
        if t.documents.values().any(|d| d.storage_path == new.storage_path) {
            return Err(conflict("documents_storage_path_key"));
        }
        let row = DocumentRow {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            site_id: new.site_id,
            owner_id: new.owner_id,
            title: new.title.clone(),
            category: new.category.clone(),
            storage_path: new.storage_path.clone(),
            mime_type: new.mime_type.clone(),
            file_size: new.file_size,
            created_at: Utc::now(),
        };
        t.documents.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_document(&self, id: Uuid) -> Result<DocumentRow, DbError> {
        self.tables().documents.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .documents
            .values()
            .filter(|d| matches(&filter.organization_id, &d.organization_id))
            .filter(|d| matches_opt(&filter.site_id, &d.site_id))
            .filter(|d| matches(&filter.category, &d.category))
            .filter(|d| {
                filter
                    .viewer_id
                    .map_or(true, |viewer| d.category != "personal" || d.owner_id == viewer)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(take_limit(rows, filter.limit))
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), DbError> {
        self.record("delete_document");
        self.tables().documents.remove(&id).map(|_| ()).ok_or(DbError::NotFound)
    }

    // -----------------------------------------------------------------------
    // material_requests
    // -----------------------------------------------------------------------

    async fn create_material_request(
        &self,
        new: &NewMaterialRequest,
    ) -> Result<MaterialRequestRow, DbError> {
        self.record("create_material_request");
        let now = Utc::now();
        let row = MaterialRequestRow {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            site_id: new.site_id,
            requested_by: new.requested_by,
            material_name: new.material_name.clone(),
            quantity: new.quantity,
            unit: new.unit.clone(),
            needed_by: new.needed_by,
            status: "pending".to_string(),
            note: new.note.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables().material_requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_material_request(&self, id: Uuid) -> Result<MaterialRequestRow, DbError> {
        self.tables().material_requests.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> Result<Vec<MaterialRequestRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .material_requests
            .values()
            .filter(|m| matches(&filter.organization_id, &m.organization_id))
            .filter(|m| matches(&filter.site_id, &m.site_id))
            .filter(|m| matches(&filter.requested_by, &m.requested_by))
            .filter(|m| matches(&filter.status, &m.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(take_limit(rows, filter.limit))
    }

    async fn set_material_request_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<MaterialRequestRow, DbError> {
        self.record("set_material_request_status");
        let mut t = self.tables();
        let request = t.material_requests.get_mut(&id).ok_or(DbError::NotFound)?;
        request.status = status.to_string();
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    // -----------------------------------------------------------------------
    // work_records
    // -----------------------------------------------------------------------

    async fn create_work_record(&self, new: &NewWorkRecord) -> Result<WorkRecordRow, DbError> {
        self.record("create_work_record");
        let mut t = self.tables();
        if t.work_records.values().any(|w| {
            w.profile_id == new.profile_id && w.site_id == new.site_id && w.work_date == new.work_date
        }) {
            return Err(conflict("work_records_profile_site_date_key"));
        }
        let row = WorkRecordRow {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            site_id: new.site_id,
            profile_id: new.profile_id,
            work_date: new.work_date,
            labor_hours: new.labor_hours,
            created_at: Utc::now(),
        };
        t.work_records.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_work_records(&self, filter: &WorkRecordFilter) -> Result<Vec<WorkRecordRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .work_records
            .values()
            .filter(|w| matches(&filter.organization_id, &w.organization_id))
            .filter(|w| matches(&filter.site_id, &w.site_id))
            .filter(|w| matches(&filter.profile_id, &w.profile_id))
            .filter(|w| filter.from.map_or(true, |from| w.work_date >= from))
            .filter(|w| filter.to.map_or(true, |to| w.work_date <= to))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.work_date.cmp(&b.work_date).then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(match filter.limit {
            Some(limit) => take_limit(rows, limit),
            None => rows,
        })
    }

    // -----------------------------------------------------------------------
    // salary
    // -----------------------------------------------------------------------

    async fn create_salary_setting(&self, new: &NewSalarySetting) -> Result<SalarySettingRow, DbError> {
        self.record("create_salary_setting");
        let mut t = self.tables();
        if t.salary_settings
            .values()
            .any(|s| s.profile_id == new.profile_id && s.effective_from == new.effective_from)
        {
            return Err(conflict("salary_settings_profile_effective_key"));
        }
        let row = SalarySettingRow {
            id: Uuid::new_v4(),
            profile_id: new.profile_id,
            daily_wage: new.daily_wage,
            tax_rate: new.tax_rate,
            effective_from: new.effective_from,
            created_at: Utc::now(),
        };
        t.salary_settings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_salary_settings(&self, profile_id: Uuid) -> Result<Vec<SalarySettingRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .salary_settings
            .values()
            .filter(|s| s.profile_id == profile_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.effective_from);
        Ok(rows)
    }

    async fn create_salary_snapshot(
        &self,
        new: &NewSalarySnapshot,
    ) -> Result<SalarySnapshotRow, DbError> {
        self.record("create_salary_snapshot");
        let mut t = self.tables();
        if t.salary_snapshots.values().any(|s| {
            s.profile_id == new.profile_id && s.year == new.year && s.month == new.month
        }) {
            return Err(conflict("salary_snapshots_profile_month_key"));
        }
        let row = SalarySnapshotRow {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            profile_id: new.profile_id,
            year: new.year,
            month: new.month,
            total_hours: new.total_hours,
            man_days: new.man_days,
            daily_wage: new.daily_wage,
            tax_rate: new.tax_rate,
            gross_pay: new.gross_pay,
            tax_amount: new.tax_amount,
            net_pay: new.net_pay,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        t.salary_snapshots.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_salary_snapshots(
        &self,
        filter: &SalarySnapshotFilter,
    ) -> Result<Vec<SalarySnapshotRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .salary_snapshots
            .values()
            .filter(|s| matches_opt(&filter.organization_id, &s.organization_id))
            .filter(|s| matches(&filter.profile_id, &s.profile_id))
            .filter(|s| matches(&filter.year, &s.year))
            .filter(|s| matches(&filter.month, &s.month))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| b.month.cmp(&a.month))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // notifications
    // -----------------------------------------------------------------------

    async fn create_notification(&self, new: &NewNotification) -> Result<NotificationRow, DbError> {
        self.record("create_notification");
        let row = NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            organization_id: new.organization_id,
            title: new.title.clone(),
            body: new.body.clone(),
            kind: new.kind.clone(),
            read_at: None,
            created_at: Utc::now(),
        };
        self.tables().notifications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_notification(&self, id: Uuid) -> Result<NotificationRow, DbError> {
        self.tables().notifications.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<NotificationRow>, DbError> {
        let mut rows: Vec<_> = self
            .tables()
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .filter(|n| !unread_only || n.read_at.is_none())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(take_limit(rows, limit))
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<NotificationRow, DbError> {
        self.record("mark_notification_read");
        let mut t = self.tables();
        let notification = t.notifications.get_mut(&id).ok_or(DbError::NotFound)?;
        if notification.read_at.is_none() {
            notification.read_at = Some(Utc::now());
        }
        Ok(notification.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn org(store: &MemoryStore, name: &str) -> OrganizationRow {
        store
            .create_organization(&NewOrganization { name: name.into(), business_number: None })
            .await
            .unwrap()
    }

    fn new_site(org: Uuid, name: &str) -> NewSite {
        NewSite {
            organization_id: org,
            name: name.into(),
            address: "서울".into(),
            status: "active".into(),
            start_date: date(2025, 1, 1),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn site_names_are_unique_per_organization() {
        let store = MemoryStore::new();
        let a = org(&store, "A건설").await;
        let b = org(&store, "B건설").await;

        store.create_site(&new_site(a.id, "본관")).await.unwrap();
        store.create_site(&new_site(b.id, "본관")).await.unwrap();
        let err = store.create_site(&new_site(a.id, "본관")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(c) if c == "sites_organization_name_key"));
    }

    #[tokio::test]
    async fn list_sites_filters_by_organization() {
        let store = MemoryStore::new();
        let a = org(&store, "A건설").await;
        let b = org(&store, "B건설").await;
        store.create_site(&new_site(a.id, "2공구")).await.unwrap();
        store.create_site(&new_site(a.id, "1공구")).await.unwrap();
        store.create_site(&new_site(b.id, "물류센터")).await.unwrap();

        let scoped = store
            .list_sites(&SiteFilter { organization_id: Some(a.id), site_id: None })
            .await
            .unwrap();
        let names: Vec<_> = scoped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1공구", "2공구"]);

        let all = store.list_sites(&SiteFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn mutations_are_recorded_even_when_they_fail() {
        let store = MemoryStore::new();
        assert_eq!(store.mutation_count(), 0);
        assert!(matches!(store.delete_site(Uuid::new_v4()).await, Err(DbError::NotFound)));
        assert_eq!(store.mutations(), vec!["delete_site"]);

        // Reads are not recorded.
        let _ = store.get_site(Uuid::new_v4()).await;
        assert_eq!(store.mutation_count(), 1);
    }

    #[tokio::test]
    async fn snapshot_is_unique_per_profile_and_month() {
        let store = MemoryStore::new();
        let snapshot = NewSalarySnapshot {
            organization_id: None,
            profile_id: Uuid::new_v4(),
            year: 2025,
            month: 3,
            total_hours: 8.0,
            man_days: 1.0,
            daily_wage: 150_000,
            tax_rate: 3.3,
            gross_pay: 150_000,
            tax_amount: 4_950,
            net_pay: 145_050,
            created_by: Uuid::new_v4(),
        };
        store.create_salary_snapshot(&snapshot).await.unwrap();
        assert!(matches!(
            store.create_salary_snapshot(&snapshot).await,
            Err(DbError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn personal_documents_hidden_from_other_viewers() {
        let store = MemoryStore::new();
        let a = org(&store, "A건설").await;
        let owner = Uuid::new_v4();
        for (i, category) in ["personal", "shared"].iter().enumerate() {
            store
                .create_document(&NewDocument {
                    organization_id: a.id,
                    site_id: None,
                    owner_id: owner,
                    title: format!("doc{i}"),
                    category: category.to_string(),
                    storage_path: format!("docs/{i}.pdf"),
                    mime_type: "application/pdf".into(),
                    file_size: 10,
                })
                .await
                .unwrap();
        }

        let other = DocumentFilter { viewer_id: Some(Uuid::new_v4()), limit: 50, ..Default::default() };
        assert_eq!(store.list_documents(&other).await.unwrap().len(), 1);

        let own = DocumentFilter { viewer_id: Some(owner), limit: 50, ..Default::default() };
        assert_eq!(store.list_documents(&own).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reading_a_notification_twice_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let n = store
            .create_notification(&NewNotification {
                recipient_id: Uuid::new_v4(),
                organization_id: None,
                title: "공지".into(),
                body: String::new(),
                kind: "info".into(),
            })
            .await
            .unwrap();
        let first = store.mark_notification_read(n.id).await.unwrap().read_at;
        let second = store.mark_notification_read(n.id).await.unwrap().read_at;
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
