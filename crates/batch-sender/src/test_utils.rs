//! In-memory wallet for tests.

use crate::{
    error::ProviderError,
    events::{EventHub, WalletEvent},
    wallet::{TxReceipt, WalletProvider},
};
use alloy::primitives::{Address, B256, U256, address};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast};

/// Default account exposed by [`MockWallet`].
pub const MOCK_ACCOUNT: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A provider call recorded by [`MockWallet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    RequestAccounts,
    ChainId,
    Decimals(Address),
    Symbol(Address),
    Allowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    BatchTransfer {
        distributor: Address,
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    },
    WaitForReceipt(B256),
}

impl MockCall {
    /// True for calls that submit a transaction.
    pub const fn is_submission(&self) -> bool {
        matches!(self, Self::Approve { .. } | Self::BatchTransfer { .. })
    }
}

#[derive(Debug)]
struct MockState {
    accounts: Result<Vec<Address>, ProviderError>,
    chain_id: u64,
    decimals: u8,
    symbol: String,
    allowance: U256,
    approve_error: Option<ProviderError>,
    transfer_error: Option<ProviderError>,
    reverted: Vec<B256>,
    revert_approval: bool,
    revert_transfer: bool,
    receipt_gate: Option<Arc<Notify>>,
    next_tx: u64,
    calls: Vec<MockCall>,
}

/// Scriptable [`WalletProvider`] that records every call.
///
/// Approvals update the stored allowance once confirmed, so a resubmission
/// observes the allowance granted by an earlier attempt.
#[derive(Debug)]
pub struct MockWallet {
    state: Mutex<MockState>,
    events: EventHub,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    /// Wallet on chain 56 exposing [`MOCK_ACCOUNT`], 18 decimal token, zero allowance.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                accounts: Ok(vec![MOCK_ACCOUNT]),
                chain_id: 56,
                decimals: 18,
                symbol: "USDT".to_string(),
                allowance: U256::ZERO,
                approve_error: None,
                transfer_error: None,
                reverted: Vec::new(),
                revert_approval: false,
                revert_transfer: false,
                receipt_gate: None,
                next_tx: 1,
                calls: Vec::new(),
            }),
            events: EventHub::new(),
        }
    }

    pub fn with_chain_id(self, chain_id: u64) -> Self {
        self.state.lock().chain_id = chain_id;
        self
    }

    pub fn with_decimals(self, decimals: u8) -> Self {
        self.state.lock().decimals = decimals;
        self
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        self.state.lock().allowance = allowance;
        self
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        self.state.lock().accounts = Ok(accounts);
        self
    }

    /// Account requests fail with `err`, as when the user declines the connection.
    pub fn rejecting_connection(self, err: ProviderError) -> Self {
        self.state.lock().accounts = Err(err);
        self
    }

    pub fn rejecting_approval(self, err: ProviderError) -> Self {
        self.state.lock().approve_error = Some(err);
        self
    }

    pub fn rejecting_transfer(self, err: ProviderError) -> Self {
        self.state.lock().transfer_error = Some(err);
        self
    }

    /// Approval transactions are mined with a failed status.
    pub fn reverting_approval(self) -> Self {
        self.state.lock().revert_approval = true;
        self
    }

    /// Batch transfers are mined with a failed status.
    pub fn reverting_transfer(self) -> Self {
        self.state.lock().revert_transfer = true;
        self
    }

    /// Every receipt wait blocks until `gate` is notified once.
    pub fn with_receipt_gate(self, gate: Arc<Notify>) -> Self {
        self.state.lock().receipt_gate = Some(gate);
        self
    }

    /// Clears scripted rejections and reverts.
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.approve_error = None;
        state.transfer_error = None;
        state.revert_approval = false;
        state.revert_transfer = false;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().chain_id = chain_id;
    }

    pub fn allowance_granted(&self) -> U256 {
        self.state.lock().allowance
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn submissions(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_submission).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Pushes a wallet notification to all subscribers.
    pub fn emit(&self, event: WalletEvent) -> usize {
        self.events.emit(event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn record(&self, call: MockCall) {
        self.state.lock().calls.push(call);
    }

    fn next_hash(state: &mut MockState) -> B256 {
        let hash = B256::from(U256::from(state.next_tx));
        state.next_tx += 1;
        hash
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.record(MockCall::RequestAccounts);
        self.state.lock().accounts.clone()
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.record(MockCall::ChainId);
        Ok(self.state.lock().chain_id)
    }

    async fn decimals(&self, token: Address) -> Result<u8, ProviderError> {
        self.record(MockCall::Decimals(token));
        Ok(self.state.lock().decimals)
    }

    async fn symbol(&self, token: Address) -> Result<String, ProviderError> {
        self.record(MockCall::Symbol(token));
        Ok(self.state.lock().symbol.clone())
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProviderError> {
        self.record(MockCall::Allowance {
            token,
            owner,
            spender,
        });
        Ok(self.state.lock().allowance)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, ProviderError> {
        self.record(MockCall::Approve {
            token,
            spender,
            amount,
        });
        let mut state = self.state.lock();
        if let Some(err) = state.approve_error.clone() {
            return Err(err);
        }
        let hash = Self::next_hash(&mut state);
        if state.revert_approval {
            state.reverted.push(hash);
        } else {
            state.allowance = amount;
        }
        Ok(hash)
    }

    async fn batch_transfer(
        &self,
        distributor: Address,
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<B256, ProviderError> {
        self.record(MockCall::BatchTransfer {
            distributor,
            token,
            recipients,
            amounts,
        });
        let mut state = self.state.lock();
        if let Some(err) = state.transfer_error.clone() {
            return Err(err);
        }
        let hash = Self::next_hash(&mut state);
        if state.revert_transfer {
            state.reverted.push(hash);
        }
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProviderError> {
        self.record(MockCall::WaitForReceipt(tx_hash));
        let gate = self.state.lock().receipt_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock();
        Ok(TxReceipt {
            tx_hash,
            block_number: Some(state.next_tx),
            gas_used: 21_000,
            success: !state.reverted.contains(&tx_hash),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
