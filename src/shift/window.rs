use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Offset of the factory's wall clock from UTC (India Standard Time).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftLabel {
    Morning,
    Evening,
    Night,
}

/// A daily clock-time interval, in minutes from local midnight.
///
/// Both ends are exclusive: an instant equal to `start` or `end` is outside
/// the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShiftWindow {
    pub label: ShiftLabel,
    pub start_offset_minutes: u32,
    pub end_offset_minutes: u32,
}

impl ShiftWindow {
    pub const fn new(label: ShiftLabel, start_offset_minutes: u32, end_offset_minutes: u32) -> Self {
        Self {
            label,
            start_offset_minutes,
            end_offset_minutes,
        }
    }

    /// 08:00-09:00, 17:00-18:00 and 22:00-23:00, in evaluation order.
    pub const fn standard() -> [ShiftWindow; 3] {
        [
            ShiftWindow::new(ShiftLabel::Morning, 8 * 60, 9 * 60),
            ShiftWindow::new(ShiftLabel::Evening, 17 * 60, 18 * 60),
            ShiftWindow::new(ShiftLabel::Night, 22 * 60, 23 * 60),
        ]
    }
}

/// Resolved `[start, end]` instants of a window on one calendar day.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowSpan {
    pub label: ShiftLabel,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WindowSpan {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant > self.start && instant < self.end
    }
}

/// The ordered window table together with the fixed offset it is read in.
#[derive(Debug, Clone)]
pub struct ShiftCalendar {
    offset: FixedOffset,
    windows: Vec<ShiftWindow>,
}

impl ShiftCalendar {
    pub fn new(offset: FixedOffset, windows: Vec<ShiftWindow>) -> Self {
        Self { offset, windows }
    }

    pub fn standard(offset: FixedOffset) -> Self {
        Self::new(offset, ShiftWindow::standard().to_vec())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn windows(&self) -> &[ShiftWindow] {
        &self.windows
    }

    /// Calendar day of `now` on the factory clock.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Local midnight of `now`'s calendar day, as a UTC instant.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_midnight = self.local_date(now).and_time(NaiveTime::MIN);
        let utc_midnight = local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc_midnight)
    }

    /// Half-open `[midnight, next midnight)` bounds of `now`'s calendar day.
    pub fn day_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of_day(now);
        (start, start + Duration::days(1))
    }

    pub fn span_on(&self, window: &ShiftWindow, now: DateTime<Utc>) -> WindowSpan {
        let midnight = self.start_of_day(now);
        WindowSpan {
            label: window.label,
            start: midnight + Duration::minutes(i64::from(window.start_offset_minutes)),
            end: midnight + Duration::minutes(i64::from(window.end_offset_minutes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap()
    }

    #[test]
    fn start_of_day_uses_factory_offset() {
        let calendar = ShiftCalendar::standard(ist());
        // 2024-03-10 20:00 UTC is 2024-03-11 01:30 IST
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();

        assert_eq!(calendar.local_date(now), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(
            calendar.start_of_day(now),
            Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn morning_span_is_eight_to_nine_local() {
        let calendar = ShiftCalendar::standard(ist());
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap();
        let span = calendar.span_on(&calendar.windows()[0], now);

        assert_eq!(span.label, ShiftLabel::Morning);
        assert_eq!(span.start, Utc.with_ymd_and_hms(2024, 3, 11, 2, 30, 0).unwrap());
        assert_eq!(span.end, Utc.with_ymd_and_hms(2024, 3, 11, 3, 30, 0).unwrap());
        assert!(!span.contains(span.start));
        assert!(!span.contains(span.end));
        assert!(span.contains(now));
    }

    #[test]
    fn labels_round_trip_through_their_codes() {
        assert_eq!(ShiftLabel::Evening.to_string(), "evening");
        assert_eq!("night".parse::<ShiftLabel>().unwrap(), ShiftLabel::Night);
        assert!("afternoon".parse::<ShiftLabel>().is_err());
    }
}
