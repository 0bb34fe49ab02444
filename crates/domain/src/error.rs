//! Domain-level error type.
//!
//! Every variant carries the user-facing (Korean) message verbatim; the
//! `api` crate maps the variant to an HTTP status and returns the message
//! unchanged.

use thiserror::Error;

/// Generic authorization failure.
pub const MSG_FORBIDDEN: &str = "권한이 없습니다";
/// A restricted caller whose profile has no organization.
pub const MSG_NO_ORGANIZATION: &str = "소속 조직 정보가 없습니다";
/// Illegal status change.
pub const MSG_INVALID_TRANSITION: &str = "허용되지 않는 상태 변경입니다";
/// No salary setting covers the requested month.
pub const MSG_NO_SALARY_SETTING: &str = "급여 설정이 없습니다";

/// Errors produced by guard checks, validation and status rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input (400).
    #[error("{0}")]
    Validation(String),

    /// The caller may not see or change the target (403).
    #[error("{0}")]
    Forbidden(String),

    /// A required row or setting does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with current state (409).
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The standard "권한이 없습니다" rejection.
    pub fn forbidden() -> Self {
        Self::Forbidden(MSG_FORBIDDEN.to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
