use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::commands::chart::send_chart;
use crate::config::Config;
use crate::models::{ChatMessage, Role};
use crate::services::relay_service::{self, RelayOutcome};

/// Render the chart carried by an assistant message, if any
pub async fn execute(ctx: &Context, msg: &Message, config: &Config) -> Result<(), String> {
    let message = ChatMessage::new(Role::Assistant, msg.content.clone());

    match relay_service::process_message(&message).map_err(|e| e.to_string())? {
        RelayOutcome::Chart { view, residual } => {
            tracing::info!("🎨 Relaying {} chart from message {}", view.ticker(), msg.id);
            send_chart(ctx, msg, &view, Some(&residual), config).await
        }
        RelayOutcome::Malformed(reason) => {
            tracing::warn!("Message {} carried an unusable chart payload: {}", msg.id, reason);
            Ok(())
        }
        RelayOutcome::Ignored => Ok(()),
    }
}
