use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::attendance::{AttendanceRecord, NewAttendance, UserShiftFlags};
use crate::shift::clock::Clock;
use crate::store::attendance::{AttendanceStore, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<u64, UserShiftFlags>,
    records: Vec<(NewAttendance, DateTime<Utc>)>,
}

/// Process-local store, used by tests and local runs without MySQL.
///
/// Mirrors the unique `(user_id, shift, attendance_date)` index of the
/// MySQL schema.
pub struct InMemoryAttendanceStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl InMemoryAttendanceStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_user(self, user_id: u64, flags: UserShiftFlags) -> Self {
        self.lock().users.insert(user_id, flags);
        self
    }

    /// Seeds a record with an explicit timestamp, bypassing the unique check.
    pub fn seed(&self, record: NewAttendance, created_at: DateTime<Utc>) {
        self.lock().records.push((record, created_at));
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn to_record(new: &NewAttendance, created_at: DateTime<Utc>) -> AttendanceRecord {
    AttendanceRecord {
        user_id: new.user_id,
        shift: new.shift,
        created_at,
        comment: new.comment.clone(),
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn shift_flags(&self, user_id: u64) -> Result<Option<UserShiftFlags>, StoreError> {
        Ok(self.lock().users.get(&user_id).copied())
    }

    async fn records_between(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let inner = self.lock();
        let mut records: Vec<AttendanceRecord> = inner
            .records
            .iter()
            .filter(|(r, at)| r.user_id == user_id && *at >= from && *at < to)
            .map(|(r, at)| to_record(r, *at))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn create(&self, record: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let created_at = self.clock.now();
        let mut inner = self.lock();

        let taken = inner.records.iter().any(|(r, _)| {
            r.user_id == record.user_id
                && r.shift == record.shift
                && r.attendance_date == record.attendance_date
        });
        if taken {
            return Err(StoreError::Duplicate);
        }

        let created = to_record(&record, created_at);
        inner.records.push((record, created_at));
        Ok(created)
    }
}
