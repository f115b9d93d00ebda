//! Shared types for wallet-forge
//!
//! Data structures that cross module boundaries are defined here
//! for consistent serialization.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Mnemonic Strength
// =============================================================================

/// Supported BIP-39 phrase lengths and their entropy strength
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WordCount {
    #[default]
    Words12,
    Words15,
    Words18,
    Words21,
    Words24,
}

impl WordCount {
    pub const ALL: [WordCount; 5] = [
        WordCount::Words12,
        WordCount::Words15,
        WordCount::Words18,
        WordCount::Words21,
        WordCount::Words24,
    ];

    pub fn words(self) -> usize {
        match self {
            WordCount::Words12 => 12,
            WordCount::Words15 => 15,
            WordCount::Words18 => 18,
            WordCount::Words21 => 21,
            WordCount::Words24 => 24,
        }
    }

    pub fn entropy_bits(self) -> usize {
        self.words() / 3 * 32
    }

    pub fn entropy_bytes(self) -> usize {
        self.entropy_bits() / 8
    }

    pub fn from_words(words: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|wc| wc.words() == words)
    }

    pub fn from_entropy_bits(bits: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|wc| wc.entropy_bits() == bits)
    }
}

impl TryFrom<u8> for WordCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WordCount::from_words(value as usize).ok_or_else(|| {
            format!(
                "Invalid mnemonic word count: {}. Expected 12, 15, 18, 21, or 24 words.",
                value
            )
        })
    }
}

impl From<WordCount> for u8 {
    fn from(value: WordCount) -> Self {
        value.words() as u8
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} words", self.words())
    }
}

// =============================================================================
// Wallet Records
// =============================================================================

/// A generated wallet as stored in the wallet file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    #[serde(with = "crate::serde_compat::wallet_id")]
    pub wallet_id: String,
    pub private_key: String,
    pub public_address: String,
    pub seed_phrase: String,
    #[serde(alias = "timestamp", with = "crate::serde_compat::timestamp")]
    pub created_at: DateTime<Utc>,
    pub block_number: u64,
    pub node_url: String,
}

/// Current UTC time truncated to whole seconds, the precision records are
/// stamped and hashed with.
pub fn utc_now_seconds() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
