use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PRICE_PER_KM: f64 = 3.50;
const DEFAULT_STORE_PATH: &str = ".fare_store.json";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub log_filter: String,
    pub default_price_per_km: f64,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let store_path = var("FARE_STORE_PATH")
            .unwrap_or_else(|| DEFAULT_STORE_PATH.into())
            .into();
        let log_filter = var("FARE_LOG").unwrap_or_else(|| "warn".into());
        let default_price_per_km = match var("FARE_PRICE_PER_KM") {
            Some(raw) => {
                let price: f64 = raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid FARE_PRICE_PER_KM: {}", e))?;
                if !price.is_finite() || price < 0.0 {
                    anyhow::bail!("invalid FARE_PRICE_PER_KM: {} is not a non-negative amount", raw);
                }
                price
            }
            None => DEFAULT_PRICE_PER_KM,
        };
        let timeout = var("GEMINI_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| anyhow::anyhow!("invalid GEMINI_TIMEOUT_SECS: {}", e))
            })
            .transpose()?;

        Ok(Self {
            store_path,
            log_filter,
            default_price_per_km,
            gemini: GeminiConfig {
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into())
                    .trim_end_matches('/')
                    .to_string(),
                timeout,
            },
        })
    }
}
