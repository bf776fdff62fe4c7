//! Data models for the chart relay
//!
//! Payloads coming in from chat text, chat messages, and the view models the
//! renderer produces for the drawing backends.

pub mod chart;
pub mod chat;
pub mod view;

pub use chart::{ChartPayload, Period, PricePoint, CHART_PAYLOAD_TYPE};
pub use chat::{ChatMessage, Role};
pub use view::{AxisRange, ChartHeader, ChartPanel, ChartStats, ChartView, Direction, PriceChange, SeriesPoint};
