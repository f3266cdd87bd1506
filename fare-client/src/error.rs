use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistanceClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("Empty response: the model returned no text")]
    EmptyResponse,
    #[error("No distance in response: {0:?}")]
    Unparseable(String),
}
