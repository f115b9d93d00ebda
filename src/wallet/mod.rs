//! Wallet Module
//!
//! Handles recovery phrase generation and key derivation for
//! generated wallets.

mod derivation;
mod keygen;

pub use derivation::*;
pub use keygen::*;

/// Error types for key generation
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    #[error("Secure entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Unsupported entropy strength: {0} bits")]
    UnsupportedStrength(usize),

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}

pub type DerivationResult<T> = Result<T, DerivationError>;
