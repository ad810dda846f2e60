//! Sender configuration.
//!
//! Defaults are the compiled-in deployment constants. A TOML file may override
//! any subset of the fields.

use crate::constants::{
    CHAIN_POLL_INTERVAL, DISTRIBUTOR_ADDRESS, NETWORK_NAME, REQUIRED_CHAIN_ID, STATUS_CLEAR_DELAY,
};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Chain the distributor lives on. Submissions on any other chain are refused.
    pub chain_id: u64,

    /// Name of `chain_id` shown in the "switch network" message.
    pub network_name: String,

    /// Distributor contract, also the allowance spender.
    pub distributor: Address,

    /// Seconds success and error messages stay visible.
    pub status_clear_secs: u64,

    /// Seconds between chain id polls of the RPC wallet.
    pub chain_poll_secs: u64,

    /// Default RPC endpoint, overridden by the command line.
    pub rpc_url: Option<String>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            chain_id: REQUIRED_CHAIN_ID,
            network_name: NETWORK_NAME.to_string(),
            distributor: DISTRIBUTOR_ADDRESS,
            status_clear_secs: STATUS_CLEAR_DELAY.as_secs(),
            chain_poll_secs: CHAIN_POLL_INTERVAL.as_secs(),
            rpc_url: None,
        }
    }
}

impl SenderConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }

    pub fn chain_poll_interval(&self) -> Duration {
        Duration::from_secs(self.chain_poll_secs)
    }
}
