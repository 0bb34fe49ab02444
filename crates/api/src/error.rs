//! HTTP error type.
//!
//! Every failure leaves the server as `{"success": false, "error": "..."}`
//! with a Korean message.  Internal details are logged, never returned.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use db::DbError;
use domain::DomainError;

pub const MSG_UNAUTHORIZED: &str = "인증이 필요합니다";
pub const MSG_INACTIVE: &str = "비활성화된 계정입니다";
pub const MSG_NOT_FOUND: &str = "요청한 데이터를 찾을 수 없습니다";
pub const MSG_CONFLICT: &str = "이미 존재하는 데이터입니다";
pub const MSG_INTERNAL: &str = "서버 오류가 발생했습니다";
pub const MSG_BAD_REQUEST: &str = "잘못된 요청입니다";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Carries the detail for the log; the client sees [`MSG_INTERNAL`].
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m,
            Self::Internal(_) => MSG_INTERNAL,
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized(MSG_UNAUTHORIZED.to_string())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(detail) => error!(%detail, "request failed"),
            other => warn!(status = status.as_u16(), message = other.message(), "request rejected"),
        }
        let body = json!({ "success": false, "error": self.message() });
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(m) => Self::BadRequest(m),
            DomainError::Forbidden(m) => Self::Forbidden(m),
            DomainError::NotFound(m) => Self::NotFound(m),
            DomainError::Conflict(m) => Self::Conflict(m),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::NotFound(MSG_NOT_FOUND.to_string()),
            DbError::Conflict(_) => Self::Conflict(MSG_CONFLICT.to_string()),
            other => Self::internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(%rejection, "rejected JSON body");
        Self::BadRequest(MSG_BAD_REQUEST.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(%rejection, "rejected query string");
        Self::BadRequest(MSG_BAD_REQUEST.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(%rejection, "rejected path parameter");
        Self::BadRequest(MSG_BAD_REQUEST.to_string())
    }
}

/// Entity-specific messages for the two expected database failures.
pub trait DbResultExt<T> {
    /// Map `DbError::NotFound` to a 404 with `msg`.
    fn or_not_found(self, msg: &str) -> Result<T, ApiError>;
    /// Map `DbError::Conflict` to a 409 with `msg`.
    fn or_conflict(self, msg: &str) -> Result<T, ApiError>;
}

impl<T> DbResultExt<T> for Result<T, DbError> {
    fn or_not_found(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            DbError::NotFound => ApiError::NotFound(msg.to_string()),
            other => other.into(),
        })
    }

    fn or_conflict(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            DbError::Conflict(_) => ApiError::Conflict(msg.to_string()),
            other => other.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::forbidden(), StatusCode::FORBIDDEN),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_shown() {
        let err = ApiError::internal("connection refused");
        assert_eq!(err.message(), MSG_INTERNAL);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn db_not_found_gets_entity_message() {
        let res: Result<(), DbError> = Err(DbError::NotFound);
        let err = res.or_not_found("현장을 찾을 수 없습니다").unwrap_err();
        assert_eq!(err.message(), "현장을 찾을 수 없습니다");

        let res: Result<(), DbError> = Err(DbError::Conflict("k".into()));
        assert_eq!(res.or_not_found("unused").unwrap_err().status(), StatusCode::CONFLICT);
    }
}
