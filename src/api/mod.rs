pub mod attendance;
pub mod bank;
pub mod user;
