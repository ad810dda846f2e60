//! Compiled-in deployment parameters.

use alloy::primitives::{Address, address};
use std::time::Duration;

/// Batch distributor contract. Acts as the allowance spender.
pub const DISTRIBUTOR_ADDRESS: Address = address!("0x60Bc65F3114E08EbB6B3418a082B2274b1141D21");

/// Chain the distributor is deployed on (BSC mainnet).
pub const REQUIRED_CHAIN_ID: u64 = 56;

/// Human readable name of [`REQUIRED_CHAIN_ID`], used in status texts.
pub const NETWORK_NAME: &str = "BSC Mainnet";

/// How long success and error messages stay on the status board.
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(8);

/// Interval at which [`crate::RpcWallet`] polls `eth_chainId` for changes.
pub const CHAIN_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Status text used when a provider error carries neither a reason nor a message.
pub const GENERIC_FAILURE: &str = "Transaction failed";

/// Separator between the address and amount fields of a recipient line.
pub const FIELD_SEPARATOR: char = ',';

/// Capacity of the wallet notification channel.
pub(crate) const EVENT_CHANNEL_SIZE: usize = 16;
