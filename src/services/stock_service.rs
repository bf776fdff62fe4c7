use chrono::DateTime;
use serde::Serialize;

use crate::api::yahoo::{ChartResult, YahooClient};
use crate::models::{ChartPayload, Period, PricePoint};

/// What the chart tool hands back to the agent
///
/// Serialises to the same JSON the agent is told to embed in its reply:
/// `{"type": "stock_chart", ...}` or `{"type": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ToolResult {
    #[serde(rename = "stock_chart")]
    Chart(ChartPayload),
    #[serde(rename = "error")]
    Error { message: String },
}

/// Fetch price history for `ticker` and shape it as a chart payload
///
/// Never fails: provider errors come back as `ToolResult::Error` so the agent
/// can relay them as ordinary text.
pub async fn plot_stock_chart(client: &YahooClient, ticker: &str, period: Period) -> ToolResult {
    let ticker = ticker.trim().to_uppercase();
    tracing::info!("📈 Fetching {} history for {}", period, ticker);

    let result = match client.get_chart(&ticker, period).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Chart fetch for {} failed: {}", ticker, e);
            return ToolResult::Error {
                message: format!("Failed to fetch data for {}: {}", ticker, e),
            };
        }
    };

    let payload = payload_from_chart(&ticker, period, result);
    tracing::info!("✓ {} points for {} ({})", payload.data.len(), ticker, period);
    ToolResult::Chart(payload)
}

/// Convert a Yahoo chart result into a payload
///
/// Rows without a close are dropped, prices are rounded to cents, dates are
/// UTC calendar days. `current_price` is the last kept close.
pub fn payload_from_chart(ticker: &str, period: Period, result: ChartResult) -> ChartPayload {
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let data: Vec<PricePoint> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = quote.close.get(i).copied().flatten()?;
            let date = DateTime::from_timestamp(ts, 0)?;
            Some(PricePoint {
                date: date.format("%Y-%m-%d").to_string(),
                price: round_cents(close),
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0) as f64,
            })
        })
        .filter(|p| p.price.is_finite())
        .collect();

    let company_name = result
        .meta
        .long_name
        .or(result.meta.short_name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ticker.to_string());

    ChartPayload {
        ticker: ticker.to_string(),
        company_name,
        period,
        current_price: data.last().map(|p| p.price),
        data,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::yahoo::ChartResponse;
    use crate::services::extract_service::extract;

    fn sample_result() -> ChartResult {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"AAPL","longName":"Apple Inc.","shortName":"Apple","currency":"USD"},
                "timestamp":[1704205800,1704292200,1704378600],
                "indicators":{"quote":[{
                    "close":[185.6399993896,null,181.9100036621],
                    "volume":[82488700,null,null]
                }]}
            }],"error":null}}"#,
        )
        .unwrap();
        body.chart.result.unwrap().remove(0)
    }

    #[test]
    fn test_payload_from_chart_skips_null_closes() {
        let payload = payload_from_chart("AAPL", Period::OneMonth, sample_result());

        assert_eq!(payload.company_name, "Apple Inc.");
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[0].date, "2024-01-02");
        assert_eq!(payload.data[0].price, 185.64);
        assert_eq!(payload.data[0].volume, 82_488_700.0);
        assert_eq!(payload.data[1].date, "2024-01-04");
        assert_eq!(payload.data[1].volume, 0.0);
        assert_eq!(payload.current_price, Some(181.91));
    }

    #[test]
    fn test_tool_result_json_shape() {
        let error = ToolResult::Error {
            message: "Failed to fetch data for ZZZZ: Not Found".to_string(),
        };
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "error");

        let chart = ToolResult::Chart(payload_from_chart("AAPL", Period::FiveDays, sample_result()));
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["type"], "stock_chart");
        assert_eq!(value["period"], "5d");
        assert_eq!(value["ticker"], "AAPL");
        assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_tool_output_survives_the_chat_round_trip() {
        let payload = payload_from_chart("AAPL", Period::OneMonth, sample_result());
        let json = serde_json::to_string_pretty(&ToolResult::Chart(payload.clone())).unwrap();
        let reply = format!("Here is Apple over the last month:\n\n```json\n{}\n```", json);

        let (extracted, residual) = extract(&reply);
        assert_eq!(extracted, Some(payload));
        assert_eq!(residual, "Here is Apple over the last month:");
    }
}
