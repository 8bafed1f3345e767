use std::fmt;

use shared::services::catalog_sync_service::DEFAULT_POPULATE_LIMIT;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PLAY_SCRAPER_URL: &str = "http://localhost:3001";
const DEFAULT_APP_STORE_RSS_URL: &str = "https://itunes.apple.com";
const DEFAULT_APP_STORE_COUNTRY: &str = "us";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub games_table: String,
    pub port: u16,
    pub play_scraper_url: String,
    pub app_store_rss_url: String,
    pub app_store_country: String,
    pub populate_limit: usize,
    pub running_in_lambda: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let games_table = lookup("GAMES_TABLE")
            .filter(|table| !table.is_empty())
            .ok_or(ConfigError::Missing("GAMES_TABLE"))?;

        Ok(AppConfig {
            games_table,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            play_scraper_url: lookup("PLAY_SCRAPER_URL")
                .unwrap_or_else(|| DEFAULT_PLAY_SCRAPER_URL.to_string()),
            app_store_rss_url: lookup("APP_STORE_RSS_URL")
                .unwrap_or_else(|| DEFAULT_APP_STORE_RSS_URL.to_string()),
            app_store_country: lookup("APP_STORE_COUNTRY")
                .unwrap_or_else(|| DEFAULT_APP_STORE_COUNTRY.to_string()),
            populate_limit: parse_or(&lookup, "POPULATE_LIMIT", DEFAULT_POPULATE_LIMIT)?,
            running_in_lambda: lookup("AWS_LAMBDA_RUNTIME_API").is_some(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
