pub mod attendance;
pub mod memory;
pub mod mysql;

pub use attendance::{AttendanceStore, StoreError};
pub use memory::InMemoryAttendanceStore;
pub use mysql::MySqlAttendanceStore;
