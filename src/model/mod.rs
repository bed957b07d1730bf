pub mod attendance;
pub mod bank;
pub mod reset_code;
pub mod role;
pub mod user;
