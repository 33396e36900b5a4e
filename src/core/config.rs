use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub auctions: AuctionConfig,
    pub prices: PriceFeedConfig,
    pub flips: FlipConfig,
    pub notify: NotifyConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuctionConfig {
    pub base_url: String,
    pub max_in_flight: usize,
    pub page_retries: u32,
    pub request_timeout_ms: u64,
    pub check_interval_ms: u64,
    pub min_refresh_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeedConfig {
    pub lowest_bin_url: String,
    pub average_url: String,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlipConfig {
    pub min_profit: i64,
    pub retention_secs: u64,
    pub store_horizon_secs: u64,
    pub seen_fallback_secs: u64,
    pub items_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let retention_secs: u64 = env_or("FLIP_RETENTION_SECS", 100);

        Ok(Config {
            auctions: AuctionConfig {
                base_url: env::var("AUCTIONS_URL")
                    .unwrap_or_else(|_| "https://api.hypixel.net/skyblock/auctions".to_string()),
                max_in_flight: env_or::<usize>("FETCH_MAX_IN_FLIGHT", 15).max(1),
                page_retries: env_or("FETCH_PAGE_RETRIES", 2),
                request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 10_000),
                check_interval_ms: env_or("SCHEDULER_CHECK_INTERVAL_MS", 1_000),
                min_refresh_interval_ms: env_or("SCHEDULER_MIN_REFRESH_MS", 55_000),
            },
            prices: PriceFeedConfig {
                lowest_bin_url: env::var("LOWEST_BIN_URL")
                    .unwrap_or_else(|_| "https://moulberry.codes/lowestbin.json".to_string()),
                average_url: env::var("AVERAGE_LOWEST_BIN_URL").unwrap_or_else(|_| {
                    "https://moulberry.codes/auction_averages_lbin/3day.json".to_string()
                }),
                refresh_interval_secs: env_or("PRICE_REFRESH_SECS", 60),
            },
            flips: FlipConfig {
                min_profit: env_or("FLIP_MIN_PROFIT", 100_000),
                retention_secs,
                // Physical eviction never happens inside the query window.
                store_horizon_secs: env_or::<u64>("FLIP_STORE_HORIZON_SECS", 3_600).max(retention_secs),
                seen_fallback_secs: env_or("SEEN_FALLBACK_SECS", 6 * 3_600),
                items_path: env::var("ITEMS_PATH").unwrap_or_else(|_| "items.json".to_string()),
            },
            notify: NotifyConfig {
                webhook_url: env::var("WEBHOOK_URL").ok().filter(|url| !url.is_empty()),
            },
            server: ServerConfig {
                port: env_or("PORT", 8080),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

impl AuctionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms.max(1))
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.min_refresh_interval_ms)
    }
}

impl FlipConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("AFS_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("AFS_TEST_GARBAGE", 7u64), 7);
        env::set_var("AFS_TEST_GARBAGE", "42");
        assert_eq!(env_or("AFS_TEST_GARBAGE", 7u64), 42);
        env::remove_var("AFS_TEST_GARBAGE");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env().unwrap();
        assert!(config.auctions.max_in_flight >= 1);
        assert!(config.flips.store_horizon_secs >= config.flips.retention_secs);
    }
}
