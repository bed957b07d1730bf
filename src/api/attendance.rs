use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::role::Role,
    shift::{
        clock::Clock,
        evaluator::{MarkOutcome, try_mark_attendance},
        window::ShiftCalendar,
    },
    store::attendance::AttendanceStore,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Width of the `attendance.comment` column.
const MAX_COMMENT_CHARS: usize = 100;

/// Everything the attendance endpoint needs, shared across workers.
#[derive(Clone)]
pub struct AttendanceDesk {
    pub store: Arc<dyn AttendanceStore>,
    pub clock: Arc<dyn Clock>,
    pub calendar: ShiftCalendar,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    /// UserId of the user
    #[schema(example = 12)]
    pub user_id: u64,
    /// Comment if required
    #[schema(example = "came by company bus")]
    pub comment: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "morning", value_type = String)]
    pub shift: crate::shift::window::ShiftLabel,
}

/// Marks attendance of a user
///
/// Only scanner, plant head and md roles can mark attendance.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Marked present.", body = MarkResponse),
        (status = 400, description = "Outside shift hours, user not on any shift, unknown user or comment too long", body = Object, example = json!({
            "message": "Cannot mark you present"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already marked present.", body = Object, example = json!({
            "message": "Attendance already marked for morning shift"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "attendance"
)]
pub async fn mark_present(
    auth: AuthUser,
    desk: web::Data<AttendanceDesk>,
    payload: web::Json<MarkAttendance>,
) -> Result<impl Responder, ApiError> {
    auth.require_any(Role::ATTENDANCE_MARKERS)?;

    let MarkAttendance { user_id, comment } = payload.into_inner();
    let comment = comment.filter(|c| !c.trim().is_empty());
    if comment
        .as_deref()
        .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
    {
        return Err(ApiError::bad_request(format!(
            "comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }

    let outcome = try_mark_attendance(
        desk.store.as_ref(),
        desk.clock.as_ref(),
        &desk.calendar,
        user_id,
        comment,
    )
    .await
    .map_err(|e| {
        tracing::info!(user_id, marked_by = auth.user_id, reason = %e, "Attendance not marked");
        ApiError::from(e)
    })?;

    let MarkOutcome::Marked(shift) = outcome;
    Ok(HttpResponse::Created().json(MarkResponse {
        success: true,
        shift,
    }))
}
