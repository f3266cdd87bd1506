use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::data::store::{KeyValueStore, load_json, store_json};
use crate::domain::error::{DomainError, EstimateError};
use crate::domain::ports::DistanceEstimator;
use crate::domain::session::Session;

pub const PRICE_PER_KM_KEY: &str = "taxi_app_price_per_km";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripEstimate {
    pub distance_km: f64,
    pub price_per_km: f64,
    pub fare: f64,
}

/// Long-trip fares: distance from the estimator times the per-km price.
pub struct TripService<S: KeyValueStore + 'static, D: DistanceEstimator + 'static> {
    store: Arc<S>,
    estimator: Arc<D>,
    default_price_per_km: f64,
}

impl<S, D> TripService<S, D>
where
    S: KeyValueStore + 'static,
    D: DistanceEstimator + 'static,
{
    pub fn new(store: Arc<S>, estimator: Arc<D>, default_price_per_km: f64) -> Self {
        Self {
            store,
            estimator,
            default_price_per_km,
        }
    }

    /// The stored price, or the configured default when none is stored or it
    /// cannot be read.
    pub fn price_per_km(&self) -> f64 {
        match load_json::<_, f64>(self.store.as_ref(), PRICE_PER_KM_KEY) {
            Ok(Some(price)) if price.is_finite() && price >= 0.0 => price,
            Ok(_) => self.default_price_per_km,
            Err(e) => {
                error!("failed to read price per km: {}", e);
                self.default_price_per_km
            }
        }
    }

    #[instrument(skip(self, session))]
    pub fn set_price_per_km(&self, session: &Session, price: f64) -> Result<(), DomainError> {
        session.require_admin()?;
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::InvalidPrice(format!(
                "{price} is not a non-negative amount"
            )));
        }
        if let Err(e) = store_json(self.store.as_ref(), PRICE_PER_KM_KEY, &price) {
            error!("failed to store price per km: {}", e);
        }
        info!(price, "price per km updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn estimate(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<TripEstimate, EstimateError> {
        let (origin, destination) = (origin.trim(), destination.trim());
        if origin.is_empty() || destination.is_empty() {
            return Err(EstimateError::MissingPlaces);
        }

        let distance_km = self
            .estimator
            .estimate_distance_km(origin, destination)
            .await
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| {
                warn!("no distance available");
                EstimateError::DistanceUnavailable
            })?;

        let price_per_km = self.price_per_km();
        Ok(TripEstimate {
            distance_km,
            price_per_km,
            fare: distance_km * price_per_km,
        })
    }
}
