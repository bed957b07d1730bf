//! Attendance marking against the daily shift windows.
//!
//! Windows are tried in the calendar's order and the first one that is both
//! enabled for the user and currently open decides the outcome: the mark is
//! either recorded for it or rejected as a duplicate. Later windows are never
//! consulted once one has matched.

use chrono::{DateTime, Utc};
use derive_more::Display;
use tracing::{debug, info};

use crate::model::attendance::{AttendanceRecord, NewAttendance, UserShiftFlags};
use crate::shift::clock::Clock;
use crate::shift::window::{ShiftCalendar, ShiftLabel};
use crate::store::attendance::{AttendanceStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked(ShiftLabel),
}

/// Expected business rejections. These are not failures of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MarkError {
    #[display(fmt = "Attendance already marked for {} shift", _0)]
    DuplicateMark(ShiftLabel),

    #[display(fmt = "Cannot mark you present")]
    NoActiveShift,

    #[display(fmt = "User is not assigned to any shift")]
    UserNotEligible,
}

#[derive(Debug, Display)]
pub enum AttendanceError {
    #[display(fmt = "{}", _0)]
    Rejected(MarkError),

    #[display(fmt = "User not found")]
    UnknownUser,

    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for AttendanceError {}

impl From<MarkError> for AttendanceError {
    fn from(e: MarkError) -> Self {
        AttendanceError::Rejected(e)
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        AttendanceError::Store(e)
    }
}

/// Decides which shift `now` may be marked for.
///
/// `todays_records` must already be limited to the user's records of the
/// local calendar day containing `now`.
pub fn evaluate(
    calendar: &ShiftCalendar,
    now: DateTime<Utc>,
    flags: UserShiftFlags,
    todays_records: &[AttendanceRecord],
) -> Result<ShiftLabel, MarkError> {
    if !flags.any() {
        return Err(MarkError::UserNotEligible);
    }

    for window in calendar.windows().iter().filter(|w| flags.allows(w.label)) {
        let span = calendar.span_on(window, now);
        if !span.contains(now) {
            continue;
        }

        if todays_records.iter().any(|r| span.contains(r.created_at)) {
            return Err(MarkError::DuplicateMark(span.label));
        }
        return Ok(span.label);
    }

    Err(MarkError::NoActiveShift)
}

/// Loads the user's flags and today's records, evaluates, and records the mark.
pub async fn try_mark_attendance(
    store: &dyn AttendanceStore,
    clock: &dyn Clock,
    calendar: &ShiftCalendar,
    user_id: u64,
    comment: Option<String>,
) -> Result<MarkOutcome, AttendanceError> {
    let now = clock.now();

    let flags = store
        .shift_flags(user_id)
        .await?
        .ok_or(AttendanceError::UnknownUser)?;

    let (day_start, day_end) = calendar.day_bounds(now);
    let todays_records = store.records_between(user_id, day_start, day_end).await?;
    debug!(user_id, records = todays_records.len(), %now, "Evaluating shift windows");

    let shift = evaluate(calendar, now, flags, &todays_records)?;

    let created = store
        .create(NewAttendance {
            user_id,
            shift,
            attendance_date: calendar.local_date(now),
            comment,
        })
        .await;

    match created {
        Ok(record) => {
            info!(user_id, shift = %record.shift, "Attendance marked");
            Ok(MarkOutcome::Marked(shift))
        }
        // lost a race against a concurrent mark for the same shift
        Err(StoreError::Duplicate) => Err(MarkError::DuplicateMark(shift).into()),
        Err(e) => Err(e.into()),
    }
}
