use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::shift::evaluator::{AttendanceError, MarkError};

/// Error returned by every handler; rendered as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(cause: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %cause, "{}", context);
        ApiError::Internal
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<AttendanceError> for ApiError {
    fn from(e: AttendanceError) -> Self {
        match e {
            AttendanceError::Rejected(reason @ MarkError::DuplicateMark(_)) => {
                ApiError::conflict(reason.to_string())
            }
            AttendanceError::Rejected(reason) => ApiError::bad_request(reason.to_string()),
            AttendanceError::UnknownUser => ApiError::bad_request("User not found"),
            AttendanceError::Store(e) => ApiError::internal(e, "Attendance store failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::window::ShiftLabel;
    use crate::store::attendance::StoreError;

    #[test]
    fn attendance_errors_map_to_statuses() {
        let dup: ApiError = AttendanceError::Rejected(MarkError::DuplicateMark(ShiftLabel::Night)).into();
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);
        assert_eq!(dup.to_string(), "Attendance already marked for night shift");

        let idle: ApiError = AttendanceError::Rejected(MarkError::NoActiveShift).into();
        assert_eq!(idle.status_code(), StatusCode::BAD_REQUEST);

        let ineligible: ApiError = AttendanceError::Rejected(MarkError::UserNotEligible).into();
        assert_eq!(ineligible.status_code(), StatusCode::BAD_REQUEST);

        let unknown: ApiError = AttendanceError::UnknownUser.into();
        assert_eq!(unknown.to_string(), "User not found");

        let store: ApiError = AttendanceError::Store(StoreError::Backend("gone".into())).into();
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.to_string(), "Internal Server Error");
    }
}
