//! Runtime configuration read from the environment (and `.env`)

use std::str::FromStr;

use crate::api::yahoo::YahooClient;
use crate::utils::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Bot accounts whose messages are treated as assistant replies.
    /// Empty means every bot other than this one.
    pub assistant_bot_ids: Vec<u64>,
    pub yahoo_base_url: String,
    pub chart_width: u32,
    pub chart_height: u32,
    pub command_cooldown_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let assistant_bot_ids = match lookup("ASSISTANT_BOT_IDS") {
            Some(raw) => parse_id_list(&raw)?,
            None => Vec::new(),
        };

        Ok(Config {
            discord_token,
            assistant_bot_ids,
            yahoo_base_url: lookup("YAHOO_BASE_URL")
                .unwrap_or_else(|| YahooClient::DEFAULT_BASE_URL.to_string()),
            chart_width: parse_or("CHART_WIDTH", lookup("CHART_WIDTH"), 1024)?,
            chart_height: parse_or("CHART_HEIGHT", lookup("CHART_HEIGHT"), 768)?,
            command_cooldown_secs: parse_or(
                "COMMAND_COOLDOWN_SECS",
                lookup("COMMAND_COOLDOWN_SECS"),
                5,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

/// Parse "123, 456 789" into ids; commas and whitespace both separate
fn parse_id_list(raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "ASSISTANT_BOT_IDS",
                value: part.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert!(config.assistant_bot_ids.is_empty());
        assert_eq!(config.yahoo_base_url, YahooClient::DEFAULT_BASE_URL);
        assert_eq!((config.chart_width, config.chart_height), (1024, 768));
        assert_eq!(config.command_cooldown_secs, 5);
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
    }

    #[test]
    fn test_assistant_ids_and_invalid_numbers() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("ASSISTANT_BOT_IDS", "111, 222 333"),
            ("CHART_WIDTH", "800"),
        ]))
        .unwrap();
        assert_eq!(config.assistant_bot_ids, vec![111, 222, 333]);
        assert_eq!(config.chart_width, 800);

        let bad = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "abc"), ("CHART_HEIGHT", "tall")]));
        assert!(matches!(bad, Err(ConfigError::Invalid { key: "CHART_HEIGHT", .. })));
    }
}
