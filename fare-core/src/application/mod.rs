pub mod auth_service;
pub mod fare_service;
pub mod trip_service;
