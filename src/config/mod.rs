use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::utils::parse_hours;

const DEFAULT_API_URL: &str = "https://api.discogs.com/";
const DEFAULT_USER_AGENT: &str = "crate-sync/0.1";
const DEFAULT_RATELIMIT_HEADER: &str = "X-Discogs-Ratelimit-Remaining";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Base URL of the upstream API; request paths are joined onto it.
    pub discogs_api_url: String,
    pub user_agent: String,
    pub ratelimit_remaining_header: String,
    pub ratelimit_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub inventory_ttl_hours: u64,
    pub wantlist_ttl_hours: u64,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            discogs_api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ratelimit_remaining_header: DEFAULT_RATELIMIT_HEADER.to_string(),
            ratelimit_timeout_secs: 60,
            request_timeout_secs: 30,
            inventory_ttl_hours: 12,
            wantlist_ttl_hours: 6,
            database_url: None,
            redis_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let mut discogs_api_url = var_or("DISCOGS_API_URL", defaults.discogs_api_url);
        if !discogs_api_url.ends_with('/') {
            discogs_api_url.push('/');
        }
        reqwest::Url::parse(&discogs_api_url)
            .map_err(|e| AppError::Config(format!("DISCOGS_API_URL: {}", e)))?;

        Ok(Config {
            discogs_api_url,
            user_agent: var_or("DISCOGS_USER_AGENT", defaults.user_agent),
            ratelimit_remaining_header: var_or(
                "DISCOGS_RATELIMIT_REMAINING_HEADER",
                defaults.ratelimit_remaining_header,
            ),
            ratelimit_timeout_secs: env::var("DISCOGS_RATELIMIT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ratelimit_timeout_secs),
            request_timeout_secs: env::var("DISCOGS_REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            inventory_ttl_hours: env::var("INVENTORY_TTL")
                .ok()
                .and_then(|v| parse_hours(&v))
                .unwrap_or(defaults.inventory_ttl_hours),
            wantlist_ttl_hours: env::var("WANTLIST_TTL")
                .ok()
                .and_then(|v| parse_hours(&v))
                .unwrap_or(defaults.wantlist_ttl_hours),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    pub fn ratelimit_timeout(&self) -> Duration {
        Duration::from_secs(self.ratelimit_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn inventory_ttl(&self) -> Duration {
        Duration::from_secs(self.inventory_ttl_hours.saturating_mul(3600))
    }

    pub fn wantlist_ttl(&self) -> Duration {
        Duration::from_secs(self.wantlist_ttl_hours.saturating_mul(3600))
    }
}

fn var_or(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}
