//! Wallet provider backed by a JSON-RPC node and a local signer.

use crate::{
    contracts::{IBatchDistributor, IERC20},
    error::ProviderError,
    events::{EventHub, Subscription, WalletEvent},
    wallet::{TxReceipt, WalletProvider},
};
use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// [`WalletProvider`] that signs with a local key.
///
/// The signer address is the only account it exposes. Chain switches are
/// detected by [`RpcWallet::watch_chain`].
#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    account: Address,
    events: EventHub,
}

impl RpcWallet {
    /// Connects to `rpc_url`, signing every transaction with `signer`.
    pub async fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ProviderError> {
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(rpc_url)
            .await?
            .erased();

        info!(%account, rpc_url, "connected wallet provider");
        Ok(Self::new(provider, account))
    }

    /// Connects without a signer. Reads work, submissions are rejected by the node.
    pub async fn connect_read_only(rpc_url: &str, account: Address) -> Result<Self, ProviderError> {
        let provider = ProviderBuilder::new().connect(rpc_url).await?.erased();
        Ok(Self::new(provider, account))
    }

    pub fn new(provider: DynProvider, account: Address) -> Self {
        Self {
            provider,
            account,
            events: EventHub::new(),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Polls `eth_chainId` every `interval` and emits [`WalletEvent::ChainChanged`]
    /// when the value differs from the previous poll.
    pub fn watch_chain(&self, interval: Duration) -> Subscription {
        let provider = self.provider.clone();
        let events = self.events.clone();
        Subscription::from_task(tokio::spawn(async move {
            let mut last_seen = None;
            loop {
                match provider.get_chain_id().await {
                    Ok(chain_id) => {
                        if let Some(previous) = last_seen
                            && previous != chain_id
                        {
                            info!(previous, chain_id, "chain changed");
                            events.emit(WalletEvent::ChainChanged(chain_id));
                        }
                        last_seen = Some(chain_id);
                    }
                    Err(err) => warn!(error = %err, "failed to poll chain id"),
                }
                tokio::time::sleep(interval).await;
            }
        }))
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(vec![self.account])
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn decimals(&self, token: Address) -> Result<u8, ProviderError> {
        Ok(IERC20::new(token, &self.provider).decimals().call().await?)
    }

    async fn symbol(&self, token: Address) -> Result<String, ProviderError> {
        Ok(IERC20::new(token, &self.provider).symbol().call().await?)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProviderError> {
        Ok(IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await?)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, ProviderError> {
        debug!(%token, %spender, %amount, "sending approval");
        let pending = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .from(self.account)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn batch_transfer(
        &self,
        distributor: Address,
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<B256, ProviderError> {
        debug!(%distributor, %token, recipients = recipients.len(), "sending batch transfer");
        let pending = IBatchDistributor::new(distributor, &self.provider)
            .batchTransferToken(token, recipients, amounts)
            .from(self.account)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await?;

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            success: receipt.status(),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}
