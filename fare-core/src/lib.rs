//! Fare table, account directory and trip estimation for a taxi company.
//!
//! The crate is layered the same way top to bottom: `domain` holds the
//! records and error types, `data` persists them through a [`KeyValueStore`],
//! `application` exposes the operations a controller calls with an explicit
//! [`Session`], and `infrastructure` carries config, logging and hashing.
//!
//! [`KeyValueStore`]: data::store::KeyValueStore
//! [`Session`]: domain::session::Session

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
