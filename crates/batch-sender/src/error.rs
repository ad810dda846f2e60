//! Error types for the batch flow.

use crate::constants::GENERIC_FAILURE;
use alloy::{
    contract,
    primitives::{B256, U256},
    providers::PendingTransactionError,
    transports::TransportError,
};
use std::fmt;

/// Failure reported by the wallet provider or the chain.
///
/// `reason` carries the provider supplied explanation (JSON-RPC error message,
/// decoded revert reason, user rejection text) and is preferred over the
/// generic `message` when building the status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    reason: Option<String>,
    message: Option<String>,
}

impl ProviderError {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            reason: None,
            message: Some(message.into()),
        }
    }

    /// An error with no detail at all. Displays as [`GENERIC_FAILURE`].
    pub const fn opaque() -> Self {
        Self {
            reason: None,
            message: None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Reason, else message, else the generic fallback.
    pub fn user_message(&self) -> &str {
        self.reason
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.message.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(GENERIC_FAILURE)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ProviderError {}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self {
                reason: Some(payload.message.to_string()),
                message: Some(err.to_string()),
            },
            None => Self::with_message(err.to_string()),
        }
    }
}

impl From<contract::Error> for ProviderError {
    fn from(err: contract::Error) -> Self {
        match err {
            contract::Error::TransportError(err) => err.into(),
            other => Self::with_message(other.to_string()),
        }
    }
}

impl From<PendingTransactionError> for ProviderError {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => err.into(),
            other => Self::with_message(other.to_string()),
        }
    }
}

/// Errors that abort a submission.
///
/// Precondition variants are raised before any transaction is sent. The
/// `Display` output is the text shown on the status board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Please connect a wallet first")]
    WalletNotConnected,

    #[error("Wallet connection failed")]
    ConnectionFailed(#[source] ProviderError),

    #[error("Please check Token Address and List")]
    InvalidTokenAddress(String),

    #[error("Please check Token Address and List")]
    EmptyRecipientList,

    #[error("Please switch to {network}")]
    WrongNetwork {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid amount on line {line}: {reason}")]
    InvalidAmount { line: usize, reason: String },

    #[error("No valid recipients in list")]
    NoValidRecipients,

    #[error("Total amount overflows uint256")]
    TotalOverflow,

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("A distribution is already in progress")]
    Busy,

    /// The wallet state was reset while the flow was running.
    #[error("Distribution cancelled")]
    Cancelled,

    #[error("Invalid progress transition {from} -> {to}")]
    InvalidTransition {
        from: crate::ProgressState,
        to: crate::ProgressState,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl BatchError {
    /// Returns true for failures detected before any provider call that could
    /// send a transaction.
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::WalletNotConnected
                | Self::InvalidTokenAddress(_)
                | Self::EmptyRecipientList
                | Self::WrongNetwork { .. }
                | Self::InvalidAmount { .. }
                | Self::NoValidRecipients
                | Self::TotalOverflow
        )
    }
}

/// Adds `amount` to `total`, failing on overflow.
pub(crate) fn checked_total(total: U256, amount: U256) -> Result<U256, BatchError> {
    total.checked_add(amount).ok_or(BatchError::TotalOverflow)
}
