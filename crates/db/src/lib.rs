//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, typed row structs, and repository functions
//! for every table in the worksite schema.  No business logic lives here:
//! organization scoping arrives as plain filter values chosen by the caller.
//!
//! [`Store`] is the seam the HTTP layer talks to.  [`PgStore`] forwards to
//! the repository functions; [`memory::MemoryStore`] is the in-process
//! double used by tests.

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use pool::DbPool;
pub use store::{PgStore, Store};
