//! Front-end state and the actions that drive it.

use crate::{
    config::SenderConfig,
    distributor::{DistributionReceipt, Distributor, FlowReporter, TransferRequest},
    error::{BatchError, ProviderError},
    events::{Subscription, WalletEvent},
    progress::ProgressState,
    status::StatusBoard,
    wallet::WalletProvider,
};
use alloy::primitives::Address;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument};

/// Snapshot of everything the front end renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub account: Option<Address>,
    /// Last chain reported by a chain change notification.
    pub chain_id: Option<u64>,
    pub token_address: String,
    pub recipients_text: String,
    pub progress: ProgressState,
    /// Set while a distribution runs. The action control is disabled meanwhile.
    pub busy: bool,
    /// Bumped on every reload. Flows started in an older generation no longer
    /// write to the state.
    pub generation: u64,
}

/// What a call to [`Controller::handle_action`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Connected(Address),
    Distributed(DistributionReceipt),
}

/// Owns the UI state and runs at most one distribution at a time.
pub struct Controller<P> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    provider: Arc<P>,
    distributor: Distributor<P>,
    state: Mutex<UiState>,
    status: StatusBoard,
}

impl<P> Clone for Controller<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: WalletProvider> Controller<P> {
    pub fn new(provider: Arc<P>, config: SenderConfig) -> Self {
        let status = StatusBoard::new(config.status_clear_delay());
        Self {
            inner: Arc::new(Inner {
                distributor: Distributor::new(Arc::clone(&provider), config),
                provider,
                state: Mutex::new(UiState::default()),
                status,
            }),
        }
    }

    pub fn distributor(&self) -> &Distributor<P> {
        &self.inner.distributor
    }

    pub fn status(&self) -> &StatusBoard {
        &self.inner.status
    }

    pub fn snapshot(&self) -> UiState {
        self.inner.state.lock().clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.state.lock().account
    }

    pub fn progress(&self) -> ProgressState {
        self.inner.state.lock().progress
    }

    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().busy
    }

    pub fn set_token_address(&self, token: impl Into<String>) {
        self.inner.state.lock().token_address = token.into();
    }

    pub fn set_recipients_text(&self, text: impl Into<String>) {
        self.inner.state.lock().recipients_text = text.into();
    }

    /// Text of the action control.
    pub fn action_label(&self) -> String {
        let state = self.inner.state.lock();
        match (state.account, state.busy) {
            (None, _) => "Connect Wallet".to_string(),
            (Some(_), true) => format!("Step {}: Processing...", state.progress.step()),
            (Some(_), false) => "Run Batch Distribution".to_string(),
        }
    }

    /// Requests account access and stores the first account.
    #[instrument(skip_all)]
    pub async fn connect_wallet(&self) -> Result<Address, BatchError> {
        let result = match self.inner.provider.request_accounts().await {
            Ok(accounts) => accounts
                .first()
                .copied()
                .ok_or_else(|| ProviderError::with_message("wallet exposed no accounts")),
            Err(err) => Err(err),
        };

        match result {
            Ok(account) => {
                info!(%account, "wallet connected");
                self.inner.state.lock().account = Some(account);
                Ok(account)
            }
            Err(err) => {
                let err = BatchError::ConnectionFailed(err);
                self.inner.status.error(err.to_string());
                Err(err)
            }
        }
    }

    /// The single action control: connects when no account is set, otherwise
    /// runs the distribution with the current form contents.
    ///
    /// Errors are also published on the status board.
    pub async fn handle_action(&self) -> Result<ActionOutcome, BatchError> {
        let prepared = {
            let mut state = self.inner.state.lock();
            if state.busy {
                return Err(BatchError::Busy);
            }
            if state.account.is_none() {
                None
            } else {
                let request = TransferRequest::new(
                    state.account,
                    &state.token_address,
                    &state.recipients_text,
                );
                if request.is_ok() {
                    state.busy = true;
                }
                Some((request, state.generation))
            }
        };

        let (request, generation) = match prepared {
            None => return self.connect_wallet().await.map(ActionOutcome::Connected),
            Some((Err(err), _)) => {
                self.inner.status.error(err.to_string());
                return Err(err);
            }
            Some((Ok(request), generation)) => (request, generation),
        };

        let reporter = StateReporter {
            inner: &self.inner,
            generation,
        };
        let result = self.inner.distributor.run(&request, &reporter).await;

        {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                debug!(generation, "state reloaded while distributing, dropping result");
                state.busy = false;
                return result.map(ActionOutcome::Distributed);
            }
            state.busy = false;
            state.progress = ProgressState::Idle;
            if result.is_ok() {
                state.recipients_text.clear();
            }
        }

        match result {
            Ok(receipt) => {
                self.inner.status.success(format!(
                    "🎉 Successfully sent to {} addresses!",
                    receipt.recipients
                ));
                Ok(ActionOutcome::Distributed(receipt))
            }
            Err(err) => {
                self.inner.status.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies a wallet notification.
    pub fn on_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let account = accounts.first().copied();
                info!(?account, "wallet accounts changed");
                self.inner.state.lock().account = account;
            }
            WalletEvent::ChainChanged(chain_id) => {
                info!(chain_id, "wallet chain changed, reloading");
                self.reload(chain_id);
            }
        }
    }

    /// Listens to the provider's notifications until the returned handle is dropped.
    pub fn subscribe_wallet_events(&self) -> Subscription {
        let inner: Weak<Inner<P>> = Arc::downgrade(&self.inner);
        Subscription::listen(self.inner.provider.subscribe(), move |event| {
            if let Some(inner) = inner.upgrade() {
                Self { inner }.on_wallet_event(event);
            }
        })
    }

    /// Resets the whole state, as a page reload would.
    ///
    /// A flow still running is cancelled before its next transaction and keeps
    /// `busy` set until it returns.
    fn reload(&self, chain_id: u64) {
        {
            let mut state = self.inner.state.lock();
            *state = UiState {
                chain_id: Some(chain_id),
                busy: state.busy,
                generation: state.generation + 1,
                ..Default::default()
            };
        }
        self.inner.status.clear();
    }
}

/// Forwards flow progress into the UI state of one generation.
struct StateReporter<'a, P> {
    inner: &'a Inner<P>,
    generation: u64,
}

impl<P: WalletProvider> FlowReporter for StateReporter<'_, P> {
    fn progress(&self, progress: ProgressState) {
        let mut state = self.inner.state.lock();
        if state.generation == self.generation {
            state.progress = progress;
        }
    }

    fn info(&self, text: &str) {
        if self.inner.state.lock().generation == self.generation {
            self.inner.status.info(text);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.inner.state.lock().generation != self.generation
    }
}
