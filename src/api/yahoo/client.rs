use std::time::Duration;

use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, ChartResponse, ChartResult};
use crate::models::Period;

/// Yahoo Finance chart API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";
    /// Yahoo rejects requests without a browser-like agent
    const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
    const TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }

    /// Map a non-success status onto an `ApiError`
    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response.text().await.unwrap_or_default();

        // Yahoo wraps most errors in the usual chart envelope
        let description = serde_json::from_str::<ChartResponse>(&body_text)
            .ok()
            .and_then(|r| r.chart.error)
            .map(|e| e.description)
            .filter(|d| !d.is_empty())
            .unwrap_or(body_text);

        match status_code {
            404 => ApiError::NotFound(description),
            429 => {
                let retry_after = retry_after.unwrap_or(1);
                warn!("Yahoo rate limited us, retry after {} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Yahoo server error {}: {}", status_code, description);
                ApiError::ServerError(status_code, description)
            }
            _ => ApiError::HttpError(status_code, description),
        }
    }

    /// GET /v8/finance/chart/{ticker}?range={period}&interval=1d
    ///
    /// Daily closes for the requested window. An empty `result` array is
    /// reported as `NotFound`.
    pub async fn get_chart(&self, ticker: &str, period: Period) -> Result<ChartResult, ApiError> {
        let url = self.chart_url(ticker);
        debug!("Fetching Yahoo chart: {} (range {})", url, period);

        let response = self
            .http_client
            .get(&url)
            .query(&[("range", period.as_str()), ("interval", "1d")])
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, "application/json")
            .timeout(Self::TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response
            .json::<ChartResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?;

        first_result(body, ticker)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the single result out of a chart envelope
pub fn first_result(body: ChartResponse, ticker: &str) -> Result<ChartResult, ApiError> {
    if let Some(error) = body.chart.error {
        return Err(ApiError::Provider(format!("{}: {}", error.code, error.description)));
    }

    body.chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::NotFound(format!("No chart data for {}", ticker)))
}
