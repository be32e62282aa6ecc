pub mod cancel;
pub mod config;
pub mod debug;
pub mod direction;
pub mod elevator_status;
pub mod error;
pub mod request;
