// src/config.rs

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const MAINNET_URL: &str = "https://api.bybit.com";
const TESTNET_URL: &str = "https://api-testnet.bybit.com";
const DEMO_URL: &str = "https://api-demo.bybit.com";

/// Environment-driven settings (`BYBIT_API_KEY`, `BYBIT_API_SECRET`,
/// `USE_TESTNET`, `USE_DEMO`, `SYMBOLS`, `HOST`, `PORT`). Defaults keep the
/// bot off mainnet unless both network flags are explicitly cleared.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub bybit_api_key: String,
    #[serde(default)]
    pub bybit_api_secret: String,
    #[serde(default = "default_true")]
    pub use_testnet: bool,
    #[serde(default)]
    pub use_demo: bool,
    #[serde(default = "default_symbols")]
    pub symbols: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_true() -> bool {
    true
}

fn default_symbols() -> String {
    "BTCUSDT,ETHUSDT,BNBUSDT".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let builder = Config::builder().add_source(Environment::default().try_parsing(true));
        builder.build()?.try_deserialize()
    }

    /// Tracked symbols: trimmed, uppercased, empties dropped. Order and
    /// duplicates are preserved.
    pub fn symbol_list(&self) -> Vec<String> {
        self.symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .collect()
    }

    /// Testnet wins over demo wins over mainnet.
    pub fn base_url(&self) -> &'static str {
        if self.use_testnet {
            TESTNET_URL
        } else if self.use_demo {
            DEMO_URL
        } else {
            MAINNET_URL
        }
    }

    pub fn network_name(&self) -> &'static str {
        if self.use_testnet {
            "TESTNET"
        } else if self.use_demo {
            "DEMO"
        } else {
            "MAINNET"
        }
    }
}
