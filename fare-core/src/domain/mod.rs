pub mod error;
pub mod fare;
pub mod ports;
pub mod session;
pub mod user;
