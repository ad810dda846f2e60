//! Approve-then-distribute flow for an ERC-20 batch distributor contract.
//!
//! A [`Controller`] holds the front-end state (connected account, token
//! address, recipient list, progress and status message) and drives the
//! [`Distributor`] through a [`WalletProvider`]: an allowance check, an
//! optional unlimited approval, then a single `batchTransferToken` call.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod constants;
pub mod contracts;
pub mod controller;
pub mod distributor;
pub mod error;
pub mod events;
pub mod parser;
pub mod progress;
pub mod rpc;
pub mod status;
pub mod wallet;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, SenderConfig};
pub use constants::{DISTRIBUTOR_ADDRESS, REQUIRED_CHAIN_ID};
pub use controller::{ActionOutcome, Controller, UiState};
pub use distributor::{
    BatchPreview, DistributionReceipt, Distributor, FlowReporter, NoopReporter, TransferRequest,
};
pub use error::{BatchError, ProviderError};
pub use events::{EventHub, Subscription, WalletEvent};
pub use parser::{RecipientEntry, TransferBatch, parse_address, parse_entries};
pub use progress::ProgressState;
pub use rpc::RpcWallet;
pub use status::{StatusBoard, StatusKind, StatusMessage};
pub use wallet::{TxReceipt, WalletProvider};
