//! Two-phase approve and distribute flow.

use crate::{
    config::SenderConfig,
    error::BatchError,
    parser::{TransferBatch, parse_address},
    progress::ProgressState,
    wallet::{TxReceipt, WalletProvider},
};
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Observer of a running flow.
pub trait FlowReporter: Send + Sync {
    /// Called after every progress transition.
    fn progress(&self, state: ProgressState);

    /// In-progress message for the user.
    fn info(&self, text: &str);

    /// Checked before each transaction. Once true, no further transaction is
    /// submitted.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Reporter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl FlowReporter for NoopReporter {
    fn progress(&self, _state: ProgressState) {}
    fn info(&self, _text: &str) {}
}

/// Inputs of a submission that passed the local preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub account: Address,
    pub token: Address,
    pub recipients_text: String,
}

impl TransferRequest {
    /// Checks account, token address and list presence. Does not touch the network.
    pub fn new(
        account: Option<Address>,
        token: &str,
        recipients_text: &str,
    ) -> Result<Self, BatchError> {
        let account = account.ok_or(BatchError::WalletNotConnected)?;
        let token = parse_address(token.trim())
            .ok_or_else(|| BatchError::InvalidTokenAddress(token.to_string()))?;
        if recipients_text.trim().is_empty() {
            return Err(BatchError::EmptyRecipientList);
        }

        Ok(Self {
            account,
            token,
            recipients_text: recipients_text.to_string(),
        })
    }
}

/// Result of a completed distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionReceipt {
    /// Present when an approval had to be sent first.
    pub approval: Option<TxReceipt>,
    pub distribution: TxReceipt,
    pub recipients: usize,
    pub total: U256,
}

/// Read-only view of what a submission would do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPreview {
    pub token: Address,
    pub symbol: String,
    pub decimals: u8,
    pub spender: Address,
    pub batch: TransferBatch,
    pub allowance: U256,
    pub needs_approval: bool,
}

/// Drives the allowance check, optional approval and batch transfer.
pub struct Distributor<P> {
    provider: Arc<P>,
    config: SenderConfig,
}

impl<P: WalletProvider> Distributor<P> {
    pub fn new(provider: Arc<P>, config: SenderConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Fails with [`BatchError::WrongNetwork`] unless the wallet is on the configured chain.
    pub async fn ensure_network(&self) -> Result<u64, BatchError> {
        let actual = self.provider.chain_id().await?;
        if actual != self.config.chain_id {
            warn!(
                expected = self.config.chain_id,
                actual, "wallet is on the wrong network"
            );
            return Err(BatchError::WrongNetwork {
                network: self.config.network_name.clone(),
                expected: self.config.chain_id,
                actual,
            });
        }
        Ok(actual)
    }

    /// Fetches the token decimals and builds the batch.
    pub async fn prepare(&self, request: &TransferRequest) -> Result<(u8, TransferBatch), BatchError> {
        let decimals = self.provider.decimals(request.token).await?;
        let batch = TransferBatch::parse(&request.recipients_text, decimals)?;
        if batch.is_empty() {
            return Err(BatchError::NoValidRecipients);
        }
        debug!(
            decimals,
            recipients = batch.len(),
            total = %batch.total,
            "prepared batch"
        );
        Ok((decimals, batch))
    }

    /// Runs the read-only part of a submission.
    pub async fn preview(&self, request: &TransferRequest) -> Result<BatchPreview, BatchError> {
        self.ensure_network().await?;
        let (decimals, batch) = self.prepare(request).await?;
        let symbol = self.provider.symbol(request.token).await?;
        let allowance = self
            .provider
            .allowance(request.token, request.account, self.config.distributor)
            .await?;

        Ok(BatchPreview {
            token: request.token,
            symbol,
            decimals,
            spender: self.config.distributor,
            needs_approval: allowance < batch.total,
            batch,
            allowance,
        })
    }

    /// Runs the full flow. On failure the reporter is returned to `Idle`.
    #[instrument(skip_all, fields(account = %request.account, token = %request.token))]
    pub async fn run(
        &self,
        request: &TransferRequest,
        reporter: &dyn FlowReporter,
    ) -> Result<DistributionReceipt, BatchError> {
        let mut progress = Progress::new(reporter);
        let result = self.execute(request, &mut progress).await;
        if let Err(err) = &result {
            warn!(error = %err, state = %progress.state, "distribution aborted");
            progress.reset();
        }
        result
    }

    async fn execute(
        &self,
        request: &TransferRequest,
        progress: &mut Progress<'_>,
    ) -> Result<DistributionReceipt, BatchError> {
        self.ensure_network().await?;
        let (_, batch) = self.prepare(request).await?;

        let spender = self.config.distributor;
        let allowance = self
            .provider
            .allowance(request.token, request.account, spender)
            .await?;

        let approval = if allowance < batch.total {
            progress.advance(ProgressState::Approving)?;
            progress.info("Step 1: Approving token usage...");
            progress.ensure_live()?;

            let tx_hash = self
                .provider
                .approve(request.token, spender, U256::MAX)
                .await?;
            let receipt = self.confirm(tx_hash).await?;
            info!(tx_hash = %receipt.tx_hash, "approval confirmed");
            progress.info("Approval confirmed! Moving to distribution...");
            Some(receipt)
        } else {
            debug!(%allowance, total = %batch.total, "allowance sufficient, skipping approval");
            None
        };

        // The wallet may have switched networks while the approval confirmed.
        progress.ensure_live()?;
        if approval.is_some() {
            self.ensure_network().await?;
        }

        progress.advance(ProgressState::Distributing)?;
        progress.info("Step 2: Distributing tokens to recipients...");

        let recipients = batch.len();
        let tx_hash = self
            .provider
            .batch_transfer(spender, request.token, batch.recipients, batch.amounts)
            .await?;
        progress.info(&format!("Transaction sent: {}...", short_hash(&tx_hash)));

        let distribution = self.confirm(tx_hash).await?;
        info!(
            tx_hash = %distribution.tx_hash,
            recipients,
            total = %batch.total,
            "batch transfer confirmed"
        );
        progress.advance(ProgressState::Idle)?;

        Ok(DistributionReceipt {
            approval,
            distribution,
            recipients,
            total: batch.total,
        })
    }

    async fn confirm(&self, tx_hash: B256) -> Result<TxReceipt, BatchError> {
        let receipt = self.provider.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(BatchError::Reverted { tx_hash });
        }
        Ok(receipt)
    }
}

/// First 16 characters of the `0x` prefixed hash.
fn short_hash(hash: &B256) -> String {
    let mut text = hash.to_string();
    text.truncate(16);
    text
}

struct Progress<'a> {
    state: ProgressState,
    reporter: &'a dyn FlowReporter,
}

impl<'a> Progress<'a> {
    fn new(reporter: &'a dyn FlowReporter) -> Self {
        Self {
            state: ProgressState::Idle,
            reporter,
        }
    }

    fn advance(&mut self, next: ProgressState) -> Result<(), BatchError> {
        self.state = self.state.transition(next)?;
        self.reporter.progress(self.state);
        Ok(())
    }

    fn info(&self, text: &str) {
        self.reporter.info(text);
    }

    fn ensure_live(&self) -> Result<(), BatchError> {
        if self.reporter.is_cancelled() {
            warn!(state = %self.state, "flow cancelled before submission");
            return Err(BatchError::Cancelled);
        }
        Ok(())
    }

    fn reset(&mut self) {
        if self.state != ProgressState::Idle {
            self.state = ProgressState::Idle;
            self.reporter.progress(ProgressState::Idle);
        }
    }
}
