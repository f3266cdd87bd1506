use thiserror::Error;

use crate::data::csv_codec::CsvImportError;
use crate::data::store::StoreError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("sign in to continue")]
    Unauthorized,
    #[error("this action requires an administrator")]
    Forbidden,
    #[error("invalid fare: {0}")]
    InvalidFare(String),
    #[error("invalid price per km: {0}")]
    InvalidPrice(String),
    #[error("there is no data in the table to export")]
    NothingToExport,
    #[error(transparent)]
    CsvImport(#[from] CsvImportError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    #[error("please fill in both the origin and the destination")]
    MissingPlaces,
    #[error("could not calculate the distance, check the places and try again")]
    DistanceUnavailable,
}
