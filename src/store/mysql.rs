use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tracing::{debug, error};

use crate::model::attendance::{AttendanceRecord, AttendanceRow, NewAttendance, UserShiftFlags};
use crate::store::attendance::{AttendanceStore, StoreError};
use crate::utils::shift_cache;

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let shift = row
            .shift
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("row {} has shift {:?}", row.id, row.shift)))?;

        Ok(AttendanceRecord {
            user_id: row.user_id,
            shift,
            created_at: row.created_at,
            comment: row.comment,
        })
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn shift_flags(&self, user_id: u64) -> Result<Option<UserShiftFlags>, StoreError> {
        if let Some(flags) = shift_cache::get(user_id).await {
            debug!(user_id, "Shift flags served from cache");
            return Ok(Some(flags));
        }

        let flags = sqlx::query_as::<_, UserShiftFlags>(
            r#"
            SELECT morning, evening, night
            FROM users
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(flags) = flags {
            shift_cache::put(user_id, flags).await;
        }

        Ok(flags)
    }

    async fn records_between(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, user_id, shift, comment, attendance_date, created_at
            FROM attendance
            WHERE user_id = ?
            AND created_at >= ?
            AND created_at < ?
            AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn create(&self, record: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, shift, comment, attendance_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(record.shift.as_ref())
        .bind(&record.comment)
        .bind(record.attendance_date)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(StoreError::Duplicate);
            }
            Err(e) => {
                error!(error = %e, user_id = record.user_id, "Attendance insert failed");
                return Err(backend(e));
            }
        };

        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, user_id, shift, comment, attendance_date, created_at
            FROM attendance
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        AttendanceRecord::try_from(row)
    }
}
