//! wallet-forge
//!
//! Batch generator for EVM wallets (BNB Smart Chain by default).
//!
//! # Architecture
//!
//! This crate provides:
//! - **node**: endpoint validation, liveness probing, retrying node selection
//! - **wallet**: BIP39 phrase generation and account key derivation
//! - **identity**: reproducible wallet ids
//! - **store**: append-only JSON wallet file with corruption recovery
//! - **orchestrator**: the per-wallet pipeline tying the above together
//! - **config**: explicit run configuration
//!
//! # Security
//!
//! This crate uses `zeroize` to clear entropy, seeds and derived keys from
//! memory when they are dropped. Log output never contains private keys or
//! recovery phrases.
//!
//! # Example
//!
//! ```rust,ignore
//! use wallet_forge::{GeneratorConfig, Generator, JsonRpcProbe};
//!
//! let config = GeneratorConfig { wallet_count: 3, ..GeneratorConfig::default() };
//! let probe = JsonRpcProbe::new(config.request_timeout())?;
//! let summary = Generator::new(&config, probe)?.run(|_| {});
//! println!("generated {} wallets", summary.generated.len());
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod node;
pub mod orchestrator;
pub mod serde_compat;
pub mod store;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use config::GeneratorConfig;
pub use error::{ErrorCode, ForgeError, ForgeResult};
pub use types::*;

pub use identity::{assign_id, verify_id};
pub use node::{
    acquire_connection, ConnectivityError, ConnectivityManager, JsonRpcProbe, NodeConnection,
    NodeProbe, ProbeError, RetryPolicy, RpcEndpoint,
};
pub use orchestrator::{Generator, ProgressEvent, RunSummary, WalletOutcome, WalletStage};
pub use store::{AppendOutcome, PersistenceError, WalletStore};
pub use wallet::{
    derive_from_entropy, generate_wallet, generate_wallet_for_bits, restore_from_phrase,
    DerivationError, GeneratedWallet, MnemonicPhrase,
};

// Re-export crypto utilities for binaries
pub use utils::crypto::{is_checksum_address, keccak256, to_checksum_address};
