//! Distance lookups for the long-trip calculator, backed by Gemini.

mod distance_text;
mod error;
mod gemini_client;

pub use distance_text::{distance_prompt, parse_distance_km};
pub use error::DistanceClientError;
pub use gemini_client::GeminiDistanceClient;
