//! Chart payload models
//!
//! A `ChartPayload` is what the market-data tool hands to the agent and what
//! the agent embeds back into its reply as JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::errors::PayloadError;

/// Discriminator value carried in the `type` field of every chart payload
pub const CHART_PAYLOAD_TYPE: &str = "stock_chart";

/// History window requested from the market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// Label used on the wire and in the provider's `range` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Comma separated list of accepted labels, for help and error messages
    pub fn supported_labels() -> String {
        Period::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = PayloadError;

    /// Parse a period label (case-insensitive, a few long-form aliases accepted)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "1day" => Ok(Period::OneDay),
            "5d" | "5days" => Ok(Period::FiveDays),
            "1mo" | "1month" => Ok(Period::OneMonth),
            "3mo" | "3months" => Ok(Period::ThreeMonths),
            "6mo" | "6months" => Ok(Period::SixMonths),
            "1y" | "1year" => Ok(Period::OneYear),
            "2y" | "2years" => Ok(Period::TwoYears),
            "5y" | "5years" => Ok(Period::FiveYears),
            "10y" | "10years" => Ok(Period::TenYears),
            "ytd" => Ok(Period::YearToDate),
            "max" | "all" => Ok(Period::Max),
            _ => Err(PayloadError::UnknownPeriod(s.to_string())),
        }
    }
}

/// A single sample of a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    /// Missing or `null` volume reads as 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub volume: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validated chart description for one ticker
///
/// `current_price` is only `None` for an empty series; the producer emits
/// `null` there because it has no last close to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub ticker: String,
    pub company_name: String,
    pub period: Period,
    pub data: Vec<PricePoint>,
    pub current_price: Option<f64>,
}

/// Loosely typed mirror of the JSON object, before defaults and checks
#[derive(Debug, Deserialize)]
struct RawChartPayload {
    #[serde(rename = "type")]
    kind: String,
    ticker: String,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    period: Option<String>,
    data: Vec<PricePoint>,
    #[serde(default)]
    current_price: Option<f64>,
}

impl ChartPayload {
    /// Build a payload from an already parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, PayloadError> {
        let raw: RawChartPayload = serde_json::from_value(value)
            .map_err(|e| PayloadError::Schema(e.to_string()))?;

        if raw.kind != CHART_PAYLOAD_TYPE {
            return Err(PayloadError::WrongType(raw.kind));
        }

        let ticker = raw.ticker.trim().to_string();
        if ticker.is_empty() {
            return Err(PayloadError::MissingField("ticker"));
        }

        let company_name = raw
            .company_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ticker.clone());

        let period = match raw.period.as_deref() {
            Some(label) => label.parse().unwrap_or_else(|_| {
                tracing::debug!("Unknown period label '{}' for {}, using {}", label, ticker, Period::default());
                Period::default()
            }),
            None => Period::default(),
        };

        if !raw.data.is_empty() && raw.current_price.is_none() {
            return Err(PayloadError::MissingField("current_price"));
        }

        Ok(ChartPayload {
            ticker,
            company_name,
            period,
            data: raw.data,
            current_price: raw.current_price,
        })
    }
}
