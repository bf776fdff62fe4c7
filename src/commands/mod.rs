pub mod chart;
pub mod help;
pub mod relay;

use std::sync::Arc;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::config::Config;
use crate::models::Role;
use crate::services::relay_service;
use crate::utils::{check_cooldown, extract_clean_error};

/// Read the shared configuration out of the client data
pub(crate) async fn bot_config(ctx: &Context) -> Result<Arc<Config>, String> {
    let data = ctx.data.read().await;
    data.get::<crate::BotConfig>()
        .cloned()
        .ok_or_else(|| "Bot configuration not initialized".to_string())
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    let config = match bot_config(ctx).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    let own_id = ctx.cache.current_user().id.get();
    let role = relay_service::role_for_author(
        msg.author.id.get(),
        msg.author.bot,
        own_id,
        &config.assistant_bot_ids,
    );

    match role {
        None => return,
        Some(Role::Assistant) => {
            if let Err(e) = relay::execute(ctx, msg, &config).await {
                tracing::error!("❌ Failed to relay chart from message {}: {}", msg.id, e);
            }
            return;
        }
        Some(_) if msg.author.bot => return,
        Some(_) => {}
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };

    let result = match command {
        "$chart" | "$stock" => {
            if let Err((remaining, should_warn)) =
                check_cooldown(msg.author.id, "$chart", config.command_cooldown_secs).await
            {
                if should_warn {
                    let embed = CreateEmbed::default()
                        .title("Command Cooldown")
                        .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                        .color(0xffa500);
                    let _ = msg
                        .channel_id
                        .send_message(ctx, CreateMessage::default().embed(embed))
                        .await;
                }
                return;
            }
            chart::execute(ctx, msg, args, &config).await
        }
        "$help" => help::execute(ctx, msg).await,
        _ => return,
    };

    if let Err(e) = result {
        let error_msg = e.to_string();
        tracing::warn!("❌ Error executing command {}: {}", command, error_msg);

        let clean_error = extract_clean_error(&error_msg);
        let user_message = if error_msg.contains("429") || error_msg.contains("Rate Limited") {
            "⚠️ **Rate Limited**: The market data provider is rate limiting us. Please try again in a moment.".to_string()
        } else if error_msg.contains("Request failed") {
            "⚠️ **Network Error**: Having trouble reaching the market data provider. Please try again.".to_string()
        } else if !clean_error.is_empty() {
            format!("❌ {}", clean_error)
        } else {
            "❌ An error occurred while executing the command.".to_string()
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}
