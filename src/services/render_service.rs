use crate::models::{
    AxisRange, ChartHeader, ChartPanel, ChartPayload, ChartStats, ChartView, Direction,
    PriceChange, PricePoint, SeriesPoint,
};
use crate::utils::errors::ChartError;
use crate::utils::format::{format_percent, format_signed, format_usd};

/// Fraction of the price span added above and below the series
const AXIS_MARGIN: f64 = 0.05;
/// Smallest padding used when every price in the series is equal
const MIN_FLAT_PADDING: f64 = 0.01;

/// Turn a chart payload into its view model
///
/// Pure: the same payload always yields the same view. An empty series yields
/// `ChartView::NoData` without touching any numbers. Only payloads that were
/// built by hand and break the extractor's guarantees produce an error.
pub fn render(payload: &ChartPayload) -> Result<ChartView, ChartError> {
    validate(payload)?;

    let (first, current) = match (payload.data.first(), payload.current_price) {
        (Some(first), Some(current)) => (first, current),
        _ => {
            return Ok(ChartView::NoData {
                ticker: payload.ticker.clone(),
                company_name: payload.company_name.clone(),
                period: payload.period,
                message: format!("No data available for {}", payload.ticker),
            })
        }
    };

    let change = price_change(first.price, current);

    let header = ChartHeader {
        ticker: payload.ticker.clone(),
        company_name: payload.company_name.clone(),
        title: format!("{} — {}", payload.ticker, payload.company_name),
        period: payload.period,
        current_price: format_usd(current),
        change,
    };

    let series = payload
        .data
        .iter()
        .enumerate()
        .map(|(index, point)| SeriesPoint {
            index,
            label: point.date.clone(),
            price: point.price,
        })
        .collect();

    let stats = ChartStats {
        start_price: format_usd(first.price),
        current_price: format_usd(current),
        points: payload.data.len().to_string(),
    };

    Ok(ChartView::Chart(ChartPanel {
        header,
        series,
        y_axis: axis_range(&payload.data),
        stats,
    }))
}

fn validate(payload: &ChartPayload) -> Result<(), ChartError> {
    if payload.ticker.trim().is_empty() {
        return Err(ChartError::InvalidPayload("ticker is empty".to_string()));
    }

    if let Some(point) = payload.data.iter().find(|p| !p.price.is_finite()) {
        return Err(ChartError::InvalidPayload(format!(
            "non-finite price on {}",
            point.date
        )));
    }

    match payload.current_price {
        Some(price) if !price.is_finite() => Err(ChartError::InvalidPayload(
            "current_price is not finite".to_string(),
        )),
        None if !payload.data.is_empty() => Err(ChartError::InvalidPayload(
            "current_price is required for a non-empty series".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Change from the period-start price; the percentage is undefined for a zero start
fn price_change(first_price: f64, current_price: f64) -> PriceChange {
    let absolute = current_price - first_price;
    let percent = if first_price == 0.0 {
        None
    } else {
        Some(absolute / first_price * 100.0).filter(|p| p.is_finite())
    };
    let direction = if absolute >= 0.0 {
        Direction::Positive
    } else {
        Direction::Negative
    };

    PriceChange {
        absolute,
        percent,
        direction,
        absolute_display: format_signed(absolute),
        percent_display: format_percent(percent),
    }
}

fn axis_range(data: &[PricePoint]) -> AxisRange {
    let min = data.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = data.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);

    let span = max - min;
    let padding = if span > 0.0 {
        span * AXIS_MARGIN
    } else {
        (max.abs() * AXIS_MARGIN).max(MIN_FLAT_PADDING)
    };

    let lower = min - padding;
    AxisRange {
        min: if min >= 0.0 { lower.max(0.0) } else { lower },
        max: max + padding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    fn point(date: &str, price: f64, volume: f64) -> PricePoint {
        PricePoint {
            date: date.to_string(),
            price,
            volume,
        }
    }

    fn aapl() -> ChartPayload {
        ChartPayload {
            ticker: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            period: Period::OneMonth,
            data: vec![
                point("2024-01-01", 150.25, 1_000_000.0),
                point("2024-01-31", 155.50, 900_000.0),
            ],
            current_price: Some(155.50),
        }
    }

    #[test]
    fn test_aapl_scenario() {
        let view = render(&aapl()).unwrap();
        let panel = view.panel().expect("chart panel");

        assert_eq!(panel.header.title, "AAPL — Apple Inc.");
        assert_eq!(panel.header.period.to_string(), "1mo");
        assert_eq!(panel.header.current_price, "$155.50");
        assert_eq!(panel.header.change.display(), "+5.25 (3.49%)");
        assert_eq!(panel.header.change.direction, Direction::Positive);
        assert_eq!(panel.stats.start_price, "$150.25");
        assert_eq!(panel.stats.current_price, "$155.50");
        assert_eq!(panel.stats.points, "2");
    }

    #[test]
    fn test_series_keeps_input_order() {
        let mut payload = aapl();
        payload.data = vec![
            point("2024-03-01", 10.0, 0.0),
            point("2024-01-01", 30.0, 0.0),
            point("2024-02-01", 20.0, 0.0),
        ];
        payload.current_price = Some(25.0);

        let view = render(&payload).unwrap();
        let labels: Vec<&str> = view
            .panel()
            .unwrap()
            .series
            .iter()
            .map(|p| p.label.as_str())
            .collect();

        assert_eq!(labels, vec!["2024-03-01", "2024-01-01", "2024-02-01"]);
    }

    #[test]
    fn test_empty_series_renders_no_data() {
        let mut payload = aapl();
        payload.data.clear();

        let view = render(&payload).unwrap();
        match view {
            ChartView::NoData { message, .. } => assert_eq!(message, "No data available for AAPL"),
            other => panic!("expected no-data view, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_start_price_shows_fallback() {
        let mut payload = aapl();
        payload.data = vec![point("2024-01-01", 0.0, 0.0), point("2024-01-02", 10.0, 0.0)];
        payload.current_price = Some(10.0);

        let view = render(&payload).unwrap();
        let change = &view.panel().unwrap().header.change;

        assert_eq!(change.percent, None);
        assert_eq!(change.display(), "+10.00 (N/A)");
        assert!(!change.display().contains("inf"));
        assert!(!change.display().contains("NaN"));
    }

    #[test]
    fn test_negative_change() {
        let mut payload = aapl();
        payload.current_price = Some(147.25);

        let view = render(&payload).unwrap();
        let change = &view.panel().unwrap().header.change;

        assert_eq!(change.direction, Direction::Negative);
        assert_eq!(change.display(), "-3.00 (-2.00%)");
    }

    #[test]
    fn test_current_price_is_authoritative() {
        let mut payload = aapl();
        payload.current_price = Some(160.0);

        let view = render(&payload).unwrap();
        let panel = view.panel().unwrap();
        assert_eq!(panel.header.current_price, "$160.00");
        assert_eq!(panel.stats.current_price, "$160.00");
        assert_eq!(panel.series.last().unwrap().price, 155.50);
    }

    #[test]
    fn test_render_is_idempotent() {
        let payload = aapl();
        let before = payload.clone();

        assert_eq!(render(&payload).unwrap(), render(&payload).unwrap());
        assert_eq!(payload, before);
    }

    #[test]
    fn test_axis_range_pads_the_series() {
        let range = axis_range(&[point("a", 100.0, 0.0), point("b", 120.0, 0.0)]);
        assert!((range.min - 99.0).abs() < 1e-9);
        assert!((range.max - 121.0).abs() < 1e-9);

        let flat = axis_range(&[point("a", 0.0, 0.0)]);
        assert_eq!(flat.min, 0.0);
        assert!(flat.max > 0.0);
    }

    #[test]
    fn test_hand_built_invalid_payload_fails_fast() {
        let mut payload = aapl();
        payload.current_price = None;
        assert!(matches!(render(&payload), Err(ChartError::InvalidPayload(_))));

        let mut payload = aapl();
        payload.data[0].price = f64::NAN;
        assert!(matches!(render(&payload), Err(ChartError::InvalidPayload(_))));
    }
}
