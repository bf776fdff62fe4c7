//! Chart view models
//!
//! Everything a drawing backend needs, already derived and formatted. The
//! PNG and embed backends read these fields and never recompute numbers.

use serde::Serialize;

use super::chart::Period;

/// Direction of the move over the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Arrow shown next to the change figures
    pub fn indicator(self) -> &'static str {
        match self {
            Direction::Positive => "▲",
            Direction::Negative => "▼",
        }
    }
}

/// Change between the period-start price and the current price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub absolute: f64,
    /// `None` when the period-start price is zero
    pub percent: Option<f64>,
    pub direction: Direction,
    pub absolute_display: String,
    pub percent_display: String,
}

impl PriceChange {
    /// "+5.25 (3.49%)"
    pub fn display(&self) -> String {
        format!("{} ({})", self.absolute_display, self.percent_display)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartHeader {
    pub ticker: String,
    pub company_name: String,
    pub title: String,
    pub period: Period,
    pub current_price: String,
    pub change: PriceChange,
}

/// A point on the horizontal axis, in the order the producer sent it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub label: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStats {
    pub start_price: String,
    pub current_price: String,
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub header: ChartHeader,
    pub series: Vec<SeriesPoint>,
    pub y_axis: AxisRange,
    pub stats: ChartStats,
}

/// Rendered form of a chart payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartView {
    NoData {
        ticker: String,
        company_name: String,
        period: Period,
        message: String,
    },
    Chart(ChartPanel),
}

impl ChartView {
    pub fn ticker(&self) -> &str {
        match self {
            ChartView::NoData { ticker, .. } => ticker,
            ChartView::Chart(panel) => &panel.header.ticker,
        }
    }

    pub fn panel(&self) -> Option<&ChartPanel> {
        match self {
            ChartView::NoData { .. } => None,
            ChartView::Chart(panel) => Some(panel),
        }
    }
}
