use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use plotters::prelude::*;

use crate::models::{ChartPanel, Direction, SeriesPoint};
use crate::utils::errors::ChartError;
use crate::utils::format::format_usd;

const POSITIVE_COLOR: RGBColor = RGBColor(22, 163, 74);
const NEGATIVE_COLOR: RGBColor = RGBColor(220, 38, 38);

/// Most date labels drawn on the x axis before they start overlapping
const MAX_X_LABELS: usize = 8;

/// Longest ticker fragment put into a file name
const MAX_FILE_TICKER_CHARS: usize = 32;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File name used when attaching the chart image to a message
pub fn attachment_name(panel: &ChartPanel) -> String {
    format!("chart_{}_{}.png", file_safe_ticker(&panel.header.ticker), panel.header.period)
}

/// Ticker reduced to characters that are safe in file names and `attachment://` URLs
fn file_safe_ticker(ticker: &str) -> String {
    let safe: String = ticker
        .chars()
        .take(MAX_FILE_TICKER_CHARS)
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '^' => c,
            _ => '_',
        })
        .collect();

    // "." and ".." are not usable as name components on their own
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        "chart".to_string()
    } else {
        safe
    }
}

/// Unique scratch path for one render
fn temp_chart_path(panel: &ChartPanel) -> PathBuf {
    std::env::temp_dir().join(format!(
        "stockchart_{}_{}_{}_{}_{}.png",
        file_safe_ticker(&panel.header.ticker),
        panel.header.period,
        std::process::id(),
        chrono::Utc::now().timestamp_millis(),
        TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Generate a price chart image as PNG bytes
pub fn generate_chart(panel: &ChartPanel, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    // BitMapBackend only encodes PNG when writing to a path
    let temp_file = temp_chart_path(panel);

    draw_chart(panel, &temp_file, width, height)?;

    let image_data = fs::read(&temp_file)?;
    if let Err(e) = fs::remove_file(&temp_file) {
        tracing::warn!("Failed to delete temporary chart file {}: {}", temp_file.display(), e);
    }

    Ok(image_data)
}

fn draw_chart(panel: &ChartPanel, path: &Path, width: u32, height: u32) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let color = match panel.header.change.direction {
        Direction::Positive => POSITIVE_COLOR,
        Direction::Negative => NEGATIVE_COLOR,
    };

    let last_index = panel.series.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} ({})", panel.header.title, panel.header.period),
            ("sans-serif", 32.0).into_font(),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..last_index, panel.y_axis.min..panel.y_axis.max)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .x_labels(panel.series.len().min(MAX_X_LABELS))
        .x_label_formatter(&|x| label_at(&panel.series, *x))
        .y_label_formatter(&|y| format_usd(*y))
        .x_desc("Date")
        .y_desc("Price")
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(LineSeries::new(
            panel.series.iter().map(|p| (p.index as f64, p.price)),
            color.stroke_width(2),
        ))
        .map_err(drawing_error)?;

    chart
        .draw_series(
            panel
                .series
                .iter()
                .map(|p| Circle::new((p.index as f64, p.price), 3, color.filled())),
        )
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}

/// Date label for an x tick; ticks between two points stay blank
fn label_at(series: &[SeriesPoint], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    series
        .get(rounded as usize)
        .map(|p| p.label.clone())
        .unwrap_or_default()
}

fn drawing_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPayload, Period, PricePoint};
    use crate::services::render_service::render;

    fn panel_for(ticker: &str) -> ChartPanel {
        let payload = ChartPayload {
            ticker: ticker.to_string(),
            company_name: "Berkshire Hathaway".to_string(),
            period: Period::FiveDays,
            data: vec![
                PricePoint {
                    date: "2024-01-01".to_string(),
                    price: 360.0,
                    volume: 0.0,
                },
                PricePoint {
                    date: "2024-01-02".to_string(),
                    price: 362.5,
                    volume: 0.0,
                },
            ],
            current_price: Some(362.5),
        };
        render(&payload).unwrap().panel().cloned().expect("chart panel")
    }

    fn series() -> Vec<SeriesPoint> {
        ["2024-01-01", "2024-01-02", "2024-01-03"]
            .iter()
            .enumerate()
            .map(|(index, date)| SeriesPoint {
                index,
                label: date.to_string(),
                price: 100.0 + index as f64,
            })
            .collect()
    }

    #[test]
    fn test_label_at_integer_ticks() {
        let series = series();
        assert_eq!(label_at(&series, 0.0), "2024-01-01");
        assert_eq!(label_at(&series, 2.0), "2024-01-03");
    }

    #[test]
    fn test_label_at_between_and_outside_points() {
        let series = series();
        assert_eq!(label_at(&series, 0.5), "");
        assert_eq!(label_at(&series, 7.0), "");
        assert_eq!(label_at(&series, -1.0), "");
    }

    #[test]
    fn test_file_names_sanitize_ticker() {
        let panel = panel_for("BRK/B");
        assert_eq!(attachment_name(&panel), "chart_BRK_B_5d.png");

        let path = temp_chart_path(&panel);
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));

        assert_eq!(file_safe_ticker("BRK B"), "BRK_B");
        assert_eq!(file_safe_ticker("^GSPC"), "^GSPC");
        assert_eq!(file_safe_ticker(".."), "chart");
    }

    #[test]
    fn test_long_ticker_is_capped() {
        let panel = panel_for(&"X".repeat(300));
        let name = attachment_name(&panel);
        assert_eq!(name, format!("chart_{}_5d.png", "X".repeat(MAX_FILE_TICKER_CHARS)));

        let temp = temp_chart_path(&panel);
        let file_name = temp.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(file_name.len() < 128);
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let panel = panel_for("AAPL");
        assert_ne!(temp_chart_path(&panel), temp_chart_path(&panel));
    }

    #[test]
    fn test_generate_chart_with_slash_ticker() {
        let png = generate_chart(&panel_for("BRK/B"), 320, 240).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
