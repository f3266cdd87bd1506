use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// One priced destination in the fare table.
///
/// The serialized field names are the ones the stored table has always used,
/// so an existing `taxi_app_fares` document loads unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    pub id: String,
    pub region: String,
    pub destination: String,
    pub meter_value: f64,
    pub counter_value: f64,
}

impl Fare {
    /// Creates a manually entered fare with a fresh random id.
    pub fn new(draft: FareDraft) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), draft)
    }

    pub fn with_id(id: String, draft: FareDraft) -> Self {
        Self {
            id,
            region: draft.region,
            destination: draft.destination,
            meter_value: draft.meter_value,
            counter_value: draft.counter_value,
        }
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): taxímetro {}, balcão {}",
            self.id,
            self.destination,
            self.region,
            format_brl(self.meter_value),
            format_brl(self.counter_value)
        )
    }
}

/// Add/edit form payload: everything a fare has except its id.
#[derive(Debug, Clone, PartialEq)]
pub struct FareDraft {
    pub region: String,
    pub destination: String,
    pub meter_value: f64,
    pub counter_value: f64,
}

impl FareDraft {
    /// Returns the draft with trimmed text fields, or the first rule it breaks.
    pub fn validate(self) -> Result<Self, DomainError> {
        let region = self.region.trim().to_string();
        let destination = self.destination.trim().to_string();

        if destination.is_empty() {
            return Err(DomainError::InvalidFare("destination is required".into()));
        }
        if region.is_empty() {
            return Err(DomainError::InvalidFare("region is required".into()));
        }
        for (name, value) in [
            ("meter value", self.meter_value),
            ("counter value", self.counter_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidFare(format!(
                    "{name} must be a non-negative amount, got {value}"
                )));
            }
        }

        Ok(Self {
            region,
            destination,
            ..self
        })
    }
}

/// On-screen currency rendering: `R$ 35,50`.
pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format!("{value:.2}").replace('.', ","))
}

/// Table written on first run, when the store has no fares yet.
pub fn seed_fares() -> Vec<Fare> {
    [
        ("3", "Zona Histórica", "Bairro Histórico", 18.50, 20.00),
        ("4", "Zona Leste", "Parque das Águas", 32.00, 35.00),
        ("5", "Zona Central", "Hotel Palace", 45.00, 50.00),
    ]
    .into_iter()
    .map(|(id, region, destination, meter_value, counter_value)| Fare {
        id: id.to_string(),
        region: region.to_string(),
        destination: destination.to_string(),
        meter_value,
        counter_value,
    })
    .collect()
}
