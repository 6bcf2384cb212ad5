use crate::player::PlayerSettings;
use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) discord_token: String,
    pub(crate) application_id: u64,
    pub(crate) idle_timeout: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) ytdlp_path: String,
    pub(crate) max_playlist_size: usize,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));

        let config = Self {
            discord_token: required("DISCORD_TOKEN")?,
            application_id: parse("DISCORD_APP_ID", &required("DISCORD_APP_ID")?)?,
            idle_timeout: Duration::from_secs(optional(&lookup, "IDLE_TIMEOUT_SECS", 300)?),
            poll_interval: Duration::from_millis(optional(&lookup, "POLL_INTERVAL_MS", 1000)?),
            ytdlp_path: lookup("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".to_string()),
            max_playlist_size: optional(&lookup, "MAX_PLAYLIST_SIZE", 100)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            bail!("IDLE_TIMEOUT_SECS must be greater than 0");
        }
        if self.poll_interval.is_zero() {
            bail!("POLL_INTERVAL_MS must be greater than 0");
        }
        if self.max_playlist_size == 0 {
            bail!("MAX_PLAYLIST_SIZE must be greater than 0");
        }
        Ok(())
    }

    pub(crate) fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            idle_timeout: self.idle_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {value:?}"))
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => parse(key, &value),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DISCORD_TOKEN", "token"), ("DISCORD_APP_ID", "1234")]).unwrap();
        assert_eq!(config.application_id, 1234);
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.ytdlp_path, "yt-dlp");
        assert_eq!(config.max_playlist_size, 100);
    }

    #[test]
    fn overrides_apply() {
        let config = load(&[
            ("DISCORD_TOKEN", "token"),
            ("DISCORD_APP_ID", "1"),
            ("IDLE_TIMEOUT_SECS", "60"),
            ("POLL_INTERVAL_MS", "250"),
            ("YTDLP_PATH", "/usr/local/bin/yt-dlp"),
            ("MAX_PLAYLIST_SIZE", " 20 "),
        ])
        .unwrap();
        let settings = config.player_settings();
        assert_eq!(settings.idle_timeout, Duration::from_secs(60));
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(config.ytdlp_path, "/usr/local/bin/yt-dlp");
        assert_eq!(config.max_playlist_size, 20);
    }

    #[test]
    fn missing_token_is_reported() {
        let error = load(&[("DISCORD_APP_ID", "1")]).unwrap_err();
        assert_eq!(error.to_string(), "DISCORD_TOKEN is not set");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(load(&[("DISCORD_TOKEN", "t"), ("DISCORD_APP_ID", "abc")]).is_err());
        assert!(load(&[
            ("DISCORD_TOKEN", "t"),
            ("DISCORD_APP_ID", "1"),
            ("POLL_INTERVAL_MS", "0"),
        ])
        .is_err());
        assert!(load(&[
            ("DISCORD_TOKEN", "t"),
            ("DISCORD_APP_ID", "1"),
            ("IDLE_TIMEOUT_SECS", "-5"),
        ])
        .is_err());
    }
}
