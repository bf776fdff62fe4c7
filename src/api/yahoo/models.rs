use serde::Deserialize;
use thiserror::Error;

/// Body of `GET /v8/finance/chart/{symbol}`
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartApiError>,
}

/// Error object Yahoo embeds in the chart envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ChartApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Price history for one symbol
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Unix seconds, parallel to the indicator arrays
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    #[serde(rename = "longName", default)]
    pub long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// Daily bars; holidays and halted sessions show up as `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

/// Errors from the Yahoo Finance API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 404, or an empty result for the symbol
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after} s")]
    RateLimited { retry_after: u64 },
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    /// Error reported inside an otherwise successful response
    #[error("Provider Error: {0}")]
    Provider(String),
}
