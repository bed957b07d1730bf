use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::model::attendance::{AttendanceRecord, NewAttendance, UserShiftFlags};

#[derive(Debug, Display)]
pub enum StoreError {
    /// The `(user, shift, day)` unique index rejected the insert.
    #[display(fmt = "attendance already recorded")]
    Duplicate,

    #[display(fmt = "corrupt attendance row: {}", _0)]
    Corrupt(String),

    #[display(fmt = "storage backend error: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

/// What the attendance evaluator needs from persistence.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// `None` when the user does not exist (or is soft-deleted).
    async fn shift_flags(&self, user_id: u64) -> Result<Option<UserShiftFlags>, StoreError>;

    /// Records of `user_id` with `from <= created_at < to`.
    async fn records_between(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn create(&self, record: NewAttendance) -> Result<AttendanceRecord, StoreError>;
}
