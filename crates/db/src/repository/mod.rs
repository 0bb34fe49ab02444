//! Repository functions — one function per database operation.
//!
//! Every function takes a `&PgPool` and returns a `Result<T, DbError>`.
//! No business logic, no domain types — pure SQL.  Optional filters use
//! the `($n IS NULL OR column = $n)` form so each query stays static.

pub mod daily_reports;
pub mod documents;
pub mod material_requests;
pub mod notifications;
pub mod organizations;
pub mod profiles;
pub mod salary;
pub mod sites;
pub mod work_records;
