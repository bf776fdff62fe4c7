use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::models::{ChartView, Direction};

const POSITIVE_EMBED_COLOR: u32 = 0x16a34a;
const NEGATIVE_EMBED_COLOR: u32 = 0xdc2626;
const NO_DATA_EMBED_COLOR: u32 = 0x808080;

/// Discord caps embed descriptions at 4096 characters
const MAX_DESCRIPTION_CHARS: usize = 4000;
const MAX_TITLE_CHARS: usize = 256;
const MAX_FOOTER_CHARS: usize = 2048;

/// Build the embed that accompanies a rendered chart
///
/// `note` is prose to show above the stats (for relayed messages, the assistant
/// text left over after the payload was cut out). `image` names the attached
/// PNG; it is ignored for the no-data view.
pub fn create_chart_embed(view: &ChartView, note: Option<&str>, image: Option<&str>) -> CreateEmbed {
    let mut embed = match view {
        ChartView::NoData {
            ticker,
            company_name,
            period,
            message,
        } => CreateEmbed::default()
            .title(clip(&format!("📉 {} — {}", ticker, company_name), MAX_TITLE_CHARS))
            .description(message)
            .field("Period", period.to_string(), true)
            .color(NO_DATA_EMBED_COLOR),
        ChartView::Chart(panel) => {
            let change = &panel.header.change;
            let color = match change.direction {
                Direction::Positive => POSITIVE_EMBED_COLOR,
                Direction::Negative => NEGATIVE_EMBED_COLOR,
            };

            let mut embed = CreateEmbed::default()
                .title(clip(&format!("📈 {}", panel.header.title), MAX_TITLE_CHARS))
                .field("Price", format!("**{}**", panel.header.current_price), true)
                .field(
                    "Change",
                    format!("{} {}", change.direction.indicator(), change.display()),
                    true,
                )
                .field("Period", format!("`{}`", panel.header.period), true)
                .field("Period Start", &panel.stats.start_price, true)
                .field("Current", &panel.stats.current_price, true)
                .field("Data Points", &panel.stats.points, true)
                .footer(CreateEmbedFooter::new(clip(
                    &format!(
                        "{} → {}",
                        panel.series.first().map(|p| p.label.as_str()).unwrap_or("-"),
                        panel.series.last().map(|p| p.label.as_str()).unwrap_or("-"),
                    ),
                    MAX_FOOTER_CHARS,
                )))
                .color(color);

            if let Some(file_name) = image {
                embed = embed.image(format!("attachment://{}", file_name));
            }
            embed
        }
    };

    if let Some(text) = note.map(str::trim).filter(|t| !t.is_empty()) {
        let clipped = clip(text, MAX_DESCRIPTION_CHARS);
        embed = match view {
            // the no-data message already occupies the description
            ChartView::NoData { message, .. } => embed.description(format!("{}\n\n{}", message, clipped)),
            ChartView::Chart(_) => embed.description(clipped),
        };
    }

    embed
}

/// First `max` characters of `text`, ending in `…` when cut
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPayload, Period, PricePoint};
    use crate::services::render_service::render;

    fn payload(company_name: String, data: Vec<PricePoint>) -> ChartPayload {
        let current_price = data.last().map(|p| p.price);
        ChartPayload {
            ticker: "AAPL".to_string(),
            company_name,
            period: Period::OneMonth,
            data,
            current_price,
        }
    }

    fn title_of(embed: &CreateEmbed) -> String {
        let json = serde_json::to_value(embed).unwrap();
        json["title"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_long_company_name_title_is_clipped() {
        let data = vec![PricePoint {
            date: "2024-01-01".to_string(),
            price: 150.0,
            volume: 0.0,
        }];
        let chart = render(&payload("A".repeat(400), data)).unwrap();
        let title = title_of(&create_chart_embed(&chart, None, Some("chart.png")));
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
        assert!(title.starts_with("📈 AAPL — AAA"));
        assert!(title.ends_with('…'));

        let no_data = render(&payload("A".repeat(400), Vec::new())).unwrap();
        let title = title_of(&create_chart_embed(&no_data, None, None));
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_short_title_is_unchanged() {
        let chart = render(&payload("Apple Inc.".to_string(), Vec::new())).unwrap();
        assert_eq!(title_of(&create_chart_embed(&chart, None, None)), "📉 AAPL — Apple Inc.");
    }

    #[test]
    fn test_clip_counts_characters() {
        assert_eq!(clip("ééééé", 3), "éé…");
        assert_eq!(clip("abc", 3), "abc");
    }
}
