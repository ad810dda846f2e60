//! Recipient list parsing and amount conversion.
//!
//! Input is newline separated `<address>,<amount>` records. Lines without the
//! separator are ignored and lines whose address does not validate are dropped
//! silently. Amounts are decimal strings scaled by the token decimals.

use crate::{
    constants::FIELD_SEPARATOR,
    error::{BatchError, checked_total},
};
use alloy::primitives::{
    Address, U256,
    utils::{ParseUnits, parse_units},
};
use serde::Serialize;

/// One accepted line of the recipient list, before amount conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEntry {
    /// 1-based line number in the submitted text.
    pub line: usize,
    pub address: Address,
    pub amount: String,
}

/// Validated recipients with amounts in the token's smallest unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferBatch {
    pub recipients: Vec<Address>,
    pub amounts: Vec<U256>,
    pub total: U256,
}

impl TransferBatch {
    /// Parses `text` and converts every accepted amount using `decimals`.
    pub fn parse(text: &str, decimals: u8) -> Result<Self, BatchError> {
        Self::from_entries(parse_entries(text), decimals)
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = RecipientEntry>,
        decimals: u8,
    ) -> Result<Self, BatchError> {
        let mut batch = Self::default();
        for entry in entries {
            let amount = parse_amount(&entry.amount, decimals).map_err(|reason| {
                BatchError::InvalidAmount {
                    line: entry.line,
                    reason,
                }
            })?;
            batch.total = checked_total(batch.total, amount)?;
            batch.recipients.push(entry.address);
            batch.amounts.push(amount);
        }
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// Splits `text` into recipient entries.
///
/// Only the first two comma separated fields of a line are read; anything
/// after a second separator is ignored.
pub fn parse_entries(text: &str) -> Vec<RecipientEntry> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.contains(FIELD_SEPARATOR))
        .filter_map(|(idx, line)| {
            let mut fields = line.split(FIELD_SEPARATOR);
            let address = fields.next()?.trim();
            let amount = fields.next()?.trim();
            let Some(address) = parse_address(address) else {
                tracing::trace!(line = idx + 1, "skipping line with invalid address");
                return None;
            };
            Some(RecipientEntry {
                line: idx + 1,
                address,
                amount: amount.to_string(),
            })
        })
        .collect()
}

/// Validates an account address.
///
/// Accepts 40 hex digits with an optional lowercase `0x` prefix. Single-case
/// input is taken as is, mixed case must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{digits}"), None).ok()
    } else {
        digits.parse().ok()
    }
}

/// Converts a non-negative decimal string into smallest units.
///
/// Trailing zeros in the fraction are ignored, any other digit past the token
/// precision is an error.
fn parse_amount(amount: &str, decimals: u8) -> Result<U256, String> {
    if amount.is_empty() {
        return Err("missing amount".to_string());
    }

    let normalized = match amount.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.len() > decimals as usize {
                return Err(format!("too many decimals, token supports {decimals}"));
            }
            let whole = if whole.is_empty() { "0" } else { whole };
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => amount.to_string(),
    };

    match parse_units(&normalized, decimals).map_err(|e| e.to_string())? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(value) if value.is_negative() => {
            Err("amount must not be negative".to_string())
        }
        ParseUnits::I256(value) => Ok(value.into_raw()),
    }
}
