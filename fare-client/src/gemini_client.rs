use std::sync::Arc;

use async_trait::async_trait;
use fare_core::domain::ports::DistanceEstimator;
use fare_core::infrastructure::config::GeminiConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::distance_text::{distance_prompt, parse_distance_km};
use crate::error::DistanceClientError;

const TEMPERATURE: f32 = 0.1;

#[derive(Clone)]
pub struct GeminiDistanceClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<serde_json::Value>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    grounding_metadata: Option<serde_json::Value>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }

    fn grounding_metadata(&self) -> Option<&serde_json::Value> {
        self.candidates.first()?.grounding_metadata.as_ref()
    }
}

impl GeminiDistanceClient {
    pub fn connect(config: &GeminiConfig) -> Result<Self, DistanceClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: Arc::new(builder.build()?),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(origin: &str, destination: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: Some(distance_prompt(origin, destination)),
                }],
            }],
            tools: vec![serde_json::json!({ "googleMaps": {} })],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }

    pub async fn request_distance(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<f64, DistanceClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DistanceClientError::MissingApiKey)?;

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(origin, destination))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(DistanceClientError::Http { status, message });
        }

        let body: GenerateContentResponse = resp.json().await?;
        Self::distance_from(&body)
    }

    fn distance_from(body: &GenerateContentResponse) -> Result<f64, DistanceClientError> {
        let text = body.text().ok_or(DistanceClientError::EmptyResponse)?;
        debug!(answer = %text.trim(), "model answered");

        parse_distance_km(&text).ok_or_else(|| {
            if let Some(metadata) = body.grounding_metadata() {
                error!(grounding_metadata = %metadata, "grounding metadata of unparseable answer");
            }
            DistanceClientError::Unparseable(text.trim().to_string())
        })
    }
}

#[async_trait]
impl DistanceEstimator for GeminiDistanceClient {
    async fn estimate_distance_km(&self, origin: &str, destination: &str) -> Option<f64> {
        match self.request_distance(origin, destination).await {
            Ok(distance) => Some(distance),
            Err(e) => {
                error!(origin, destination, "distance lookup failed: {}", e);
                None
            }
        }
    }
}
