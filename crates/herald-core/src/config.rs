use crate::app_config::{AppConfig, StateLocation};
use crate::ConfigError;

pub(crate) const DEFAULT_FEED_URL: &str = "https://rss.art19.com/carolina-insider";
pub(crate) const DEFAULT_USER_AGENT: &str = "podherald/0.1 (+episode-announcer)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Blank values are treated the same as unset ones, so `FOO=` in a `.env`
/// file cannot satisfy a required setting.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::{Ipv4Addr, SocketAddr};
    use std::path::PathBuf;

    let present = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        present(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        present(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let discord_bot_token = require("DISCORD_BOT_TOKEN")?;
    let forum_channel_id = require("FORUM_CHANNEL_ID")?;
    let spotify_client_id = require("SPOTIFY_CLIENT_ID")?;
    let spotify_client_secret = require("SPOTIFY_CLIENT_SECRET")?;

    let poll_interval_secs = parse_u64("POLL_SECONDS", "900")?;
    if poll_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POLL_SECONDS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let port = or_default("PORT", "5000")
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PORT".to_string(),
            reason: e.to_string(),
        })?;

    let state_location = match present("STATE_S3_BUCKET") {
        Some(bucket) => StateLocation::S3 {
            bucket,
            key: or_default("STATE_S3_KEY", "carolina-insider/last.json"),
            region: or_default("STATE_S3_REGION", "us-east-1"),
        },
        None => StateLocation::File(PathBuf::from(or_default("STATE_FILE", "./state.json"))),
    };

    Ok(AppConfig {
        discord_bot_token,
        forum_channel_id,
        forum_tag_ids: parse_list(&or_default("FORUM_TAG_IDS", "")),
        feed_url: or_default("FEED_URL", DEFAULT_FEED_URL),
        poll_interval_secs,
        show_name: or_default("SHOW_NAME", "Carolina Insider"),
        apple_country: or_default("APPLE_COUNTRY", "US"),
        apple_show_id: or_default("APPLE_SHOW_ID", "1153767411"),
        spotify_client_id,
        spotify_client_secret,
        spotify_market: or_default("SPOTIFY_MARKET", "US"),
        spotify_show_id: or_default("SPOTIFY_SHOW_ID", "2QJzvnL7OWI9XZ432l3glX"),
        state_location,
        bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        log_level: or_default("HERALD_LOG_LEVEL", "info"),
        http_timeout_secs: parse_u64("HERALD_HTTP_TIMEOUT_SECS", "15")?,
        user_agent: or_default("HERALD_USER_AGENT", DEFAULT_USER_AGENT),
    })
}

/// Split a comma-separated list, dropping blank entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
