use std::env;
use std::fs;

use anyhow::{ensure, Context};
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "BANK_CONFIG";

/// Withdrawal policy applied to every account a bank opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalLimits {
    /// Largest amount a single withdrawal may take.
    pub per_withdrawal: Decimal,
    /// Withdrawals allowed inside one rolling window.
    pub per_window: usize,
    pub window_hours: u32,
}

impl WithdrawalLimits {
    pub fn window(&self) -> Duration {
        Duration::hours(i64::from(self.window_hours))
    }
}

impl Default for WithdrawalLimits {
    fn default() -> Self {
        WithdrawalLimits {
            per_withdrawal: dec!(500.00),
            per_window: 3,
            window_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: WithdrawalLimits,
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Config> {
        let config: Config = serde_json::from_str(json).context("malformed bank configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `BANK_CONFIG`, or the defaults when unset.
    pub fn from_env() -> anyhow::Result<Config> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.to_string_lossy()))?;
                let config = Config::from_json(&json)?;
                log::info!("Loaded configuration from {}", path.to_string_lossy());
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let limits = &self.limits;
        ensure!(
            limits.per_withdrawal > Decimal::ZERO,
            "per_withdrawal must be positive"
        );
        ensure!(limits.per_window > 0, "per_window must be positive");
        ensure!(limits.window_hours > 0, "window_hours must be positive");
        Ok(())
    }
}
