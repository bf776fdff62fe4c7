use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::Period;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Stock Chart Commands")
        .description("Charts stock prices on request, and turns chart data posted by the assistant bot into images.")
        .color(0x00b0f4)
        .field(
            "📈 Charts",
            "`$chart <TICKER> [period]` - Plot closing prices (alias `$stock`)\n`$help` - Show this help message",
            false,
        )
        .field("🗓️ Periods", format!("{} (default `1mo`)", Period::supported_labels()), false)
        .field(
            "🤖 Assistant replies",
            "When the assistant includes a `stock_chart` JSON block in its reply, the chart is posted underneath it.",
            false,
        )
        .field("⚡ Rate Limiting", "Cooldown per user on `$chart`", false);

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
