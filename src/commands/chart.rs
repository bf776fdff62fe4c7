use serenity::builder::{CreateAttachment, CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::config::Config;
use crate::models::{ChartView, Period};
use crate::services::stock_service::{self, ToolResult};
use crate::services::{chart_service, embed_service, render_service};

const MAX_TICKER_LEN: usize = 12;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str], config: &Config) -> Result<(), String> {
    tracing::info!("📈 Chart command called by {} with args: {:?}", msg.author.id, args);

    if args.is_empty() {
        let help_embed = CreateEmbed::default()
            .title("📈 Chart Command")
            .description("Plot the closing price history of a stock")
            .field("Usage", "`$chart <TICKER> [period]`", false)
            .field("Examples", "`$chart AAPL` (last month)\n`$chart TSLA 6mo`\n`$chart ^GSPC 1y`", false)
            .field("Periods", Period::supported_labels(), false)
            .color(0x00b0f4);

        msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(help_embed))
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    }

    let ticker = parse_ticker(args[0])?;
    let period = match args.get(1) {
        Some(raw) => raw.parse::<Period>().map_err(|_| {
            format!("❌ Unknown period '{}'. Supported: {}", raw, Period::supported_labels())
        })?,
        None => Period::default(),
    };

    let client = {
        let data = ctx.data.read().await;
        data.get::<crate::MarketData>()
            .ok_or("Market data client not initialized".to_string())?
            .clone()
    };

    if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    let payload = match stock_service::plot_stock_chart(&client, &ticker, period).await {
        ToolResult::Chart(payload) => payload,
        ToolResult::Error { message } => return Err(message),
    };

    let view = render_service::render(&payload).map_err(|e| e.to_string())?;
    send_chart(ctx, msg, &view, None, config).await
}

/// Reply to `msg` with the chart embed and, when there is data, the PNG
pub async fn send_chart(
    ctx: &Context,
    msg: &Message,
    view: &ChartView,
    note: Option<&str>,
    config: &Config,
) -> Result<(), String> {
    let mut message = CreateMessage::default().reference_message(msg);

    match view.panel() {
        Some(panel) => {
            let file_name = chart_service::attachment_name(panel);
            let (width, height) = (config.chart_width, config.chart_height);
            let owned = panel.clone();

            let image_data = tokio::task::spawn_blocking(move || {
                chart_service::generate_chart(&owned, width, height)
            })
            .await
            .map_err(|e| format!("Chart task failed: {}", e))?
            .map_err(|e| e.to_string())?;

            if image_data.is_empty() {
                return Err("❌ Chart generation failed: produced empty image data".to_string());
            }
            tracing::info!("✓ Chart generated for {}: {} bytes", panel.header.ticker, image_data.len());

            let embed = embed_service::create_chart_embed(view, note, Some(&file_name));
            message = message
                .embed(embed)
                .add_file(CreateAttachment::bytes(image_data, file_name));
        }
        None => {
            tracing::info!("No data for {}, sending placeholder", view.ticker());
            message = message.embed(embed_service::create_chart_embed(view, note, None));
        }
    }

    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| format!("Failed to send chart: {}", e))?;

    Ok(())
}

/// Normalise a ticker argument: uppercase, letters/digits plus `. - ^ =`
fn parse_ticker(raw: &str) -> Result<String, String> {
    let ticker = raw.trim().to_uppercase();
    let valid_chars = ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN || !valid_chars {
        return Err(format!("❌ Invalid ticker '{}'", raw));
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker() {
        assert_eq!(parse_ticker("aapl").unwrap(), "AAPL");
        assert_eq!(parse_ticker("brk-b").unwrap(), "BRK-B");
        assert_eq!(parse_ticker("^gspc").unwrap(), "^GSPC");
        assert!(parse_ticker("AAPL/USD").is_err());
        assert!(parse_ticker("WAYTOOLONGTICKER").is_err());
    }
}
