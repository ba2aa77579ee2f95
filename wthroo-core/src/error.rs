use thiserror::Error;

/// Errors surfaced by a weather lookup.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to initialize HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to OpenWeatherMap failed")]
    Transport(#[source] reqwest::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The response body could not be re-serialized as JSON.
#[derive(Debug, Error)]
#[error("JSON parse error: {0}")]
pub struct FormatError(#[from] serde_json::Error);

/// A flag or config value did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
