use async_trait::async_trait;

/// Looks up the driving distance between two free-text places.
///
/// Implementations return `None` for every failure: transport errors, missing
/// credentials, and answers that do not contain a positive number.
#[async_trait]
pub trait DistanceEstimator: Send + Sync {
    async fn estimate_distance_km(&self, origin: &str, destination: &str) -> Option<f64>;
}
