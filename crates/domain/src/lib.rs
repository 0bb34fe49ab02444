//! `domain` crate — roles, callers, status rules, the organization access
//! guard and payroll arithmetic.
//!
//! Nothing in here performs I/O.  The `api` crate loads rows through the
//! `db` crate and asks this crate whether the caller may touch them.

pub mod access;
pub mod error;
pub mod models;
pub mod payroll;
pub mod status;
pub mod validation;

pub use access::{Caller, OrgScope};
pub use error::DomainError;
pub use models::{DocumentCategory, NotificationKind, Role, SiteStatus};
pub use payroll::{PayrollBreakdown, PayrollInput};
pub use status::{MaterialRequestStatus, ReportStatus};
