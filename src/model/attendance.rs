use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shift::window::ShiftLabel;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    pub shift: String,
    pub comment: Option<String>,
    pub attendance_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub user_id: u64,
    pub shift: ShiftLabel,
    pub created_at: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Insert payload. `created_at` is captured by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub user_id: u64,
    pub shift: ShiftLabel,
    pub attendance_date: NaiveDate,
    pub comment: Option<String>,
}

/// Which shift windows apply to a user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct UserShiftFlags {
    pub morning: bool,
    pub evening: bool,
    pub night: bool,
}

impl UserShiftFlags {
    pub fn allows(&self, label: ShiftLabel) -> bool {
        match label {
            ShiftLabel::Morning => self.morning,
            ShiftLabel::Evening => self.evening,
            ShiftLabel::Night => self.night,
        }
    }

    pub fn any(&self) -> bool {
        self.morning || self.evening || self.night
    }
}
