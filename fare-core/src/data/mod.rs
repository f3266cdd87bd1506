pub mod csv_codec;
pub mod fare_repository;
pub mod store;
pub mod user_repository;
