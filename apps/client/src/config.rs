use std::time::Duration;

/// Client configuration, loaded from environment variables with defaults for
/// everything except deployment-specific origins.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay WebSocket URL (e.g. `ws://localhost:3001/socket`).
    pub relay_url: String,
    /// Wallet/withdrawal HTTP API origin.
    pub api_url: String,
    /// Third-party price feed endpoint (`.../simple/price`).
    pub price_url: String,
    /// Region used when an invite or room creation carries none.
    pub default_region: String,
    /// Per-attempt connect timeout.
    pub connect_timeout: Duration,
    /// Fixed delay between connect attempts.
    pub reconnect_delay: Duration,
    /// Attempt ceiling before the connection parks until an explicit
    /// re-trigger.
    pub max_connect_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: "ws://localhost:3001/socket".to_string(),
            api_url: "http://localhost:3000".to_string(),
            price_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            default_region: "eu".to_string(),
            connect_timeout: Duration::from_millis(10_000),
            reconnect_delay: Duration::from_millis(1_000),
            max_connect_attempts: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults above.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            relay_url: var_or("RELAY_URL", &defaults.relay_url),
            api_url: var_or("API_URL", &defaults.api_url),
            price_url: var_or("PRICE_URL", &defaults.price_url),
            default_region: var_or("GAME_REGION", &defaults.default_region),
            connect_timeout: ms_var("RELAY_CONNECT_TIMEOUT_MS", defaults.connect_timeout),
            reconnect_delay: ms_var("RELAY_RECONNECT_DELAY_MS", defaults.reconnect_delay),
            max_connect_attempts: std::env::var("RELAY_MAX_CONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connect_attempts),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn ms_var(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
