use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::yahoo::YahooClient;
use config::Config;

struct Handler;

struct BotData;

impl TypeMapKey for BotData {
    type Value = Instant;
}

struct BotConfig;

impl TypeMapKey for BotConfig {
    type Value = Arc<Config>;
}

struct MarketData;

impl TypeMapKey for MarketData {
    type Value = YahooClient;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let startup = {
            let data = ctx.data.read().await;
            data.get::<BotData>().map(|started| started.elapsed())
        };
        if let Some(elapsed) = startup {
            debug!("Ready {}ms after startup", elapsed.as_millis());
        }

        match ctx.http.get_current_user().await {
            Ok(_) => info!("No rate limit detected - Bot is fully ready!"),
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("429") || error_msg.contains("rate limit") || error_msg.contains("Ratelimited") {
                    warn!("Bot is being rate limited by Discord! Error: {}", error_msg);
                } else {
                    warn!("Failed to check rate limit status: {}", error_msg);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::from_default_env()
        .add_directive("stockchart_relay=debug".parse().expect("static directive"))
        .add_directive("serenity=warn".parse().expect("static directive"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting stock chart relay...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    if config.assistant_bot_ids.is_empty() {
        info!("Relaying charts from any bot account");
    } else {
        info!("Relaying charts from {} assistant bot(s)", config.assistant_bot_ids.len());
    }

    let market_data = YahooClient::with_base_url(config.yahoo_base_url.clone());

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotData>(Instant::now());
        data.insert::<BotConfig>(config);
        data.insert::<MarketData>(market_data);
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
