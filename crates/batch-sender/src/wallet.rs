//! Boundary to the wallet provider and the contracts behind it.

use crate::{error::ProviderError, events::WalletEvent};
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// False when the transaction was mined but reverted.
    pub success: bool,
}

/// Everything the batch flow needs from a wallet.
///
/// Submissions return as soon as the wallet accepted the transaction;
/// [`WalletProvider::wait_for_receipt`] blocks until it is mined, with no
/// timeout of its own.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Asks the wallet to expose its accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    async fn decimals(&self, token: Address) -> Result<u8, ProviderError>;

    async fn symbol(&self, token: Address) -> Result<String, ProviderError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProviderError>;

    /// Sends `approve(spender, amount)` to `token`. Returns the transaction hash.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, ProviderError>;

    /// Sends `batchTransferToken(token, recipients, amounts)` to `distributor`.
    async fn batch_transfer(
        &self,
        distributor: Address,
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<B256, ProviderError>;

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError>;

    /// Account and chain change notifications.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}
