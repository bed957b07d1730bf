pub mod clock;
pub mod evaluator;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use evaluator::{AttendanceError, MarkError, MarkOutcome, evaluate, try_mark_attendance};
pub use window::{ShiftCalendar, ShiftLabel, ShiftWindow};
