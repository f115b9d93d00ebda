//! Key Derivation
//!
//! Derives the single EVM account used by generated wallets from a BIP39
//! seed: BIP32 path `m/44'/60'/0'/0/0`, address from the keccak256 of the
//! uncompressed public key.
//!
//! SECURITY: All private key material is zeroized when no longer needed.

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::Network;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{DerivationError, DerivationResult};
use crate::utils::{keccak256, to_checksum_address};

/// Default account path (first external address of account 0)
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Keypair for one EVM account
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EvmAccount {
    /// `0x`-prefixed 32-byte secret key
    pub private_hex: String,
    /// EIP-55 checksummed address
    pub address: String,
}

impl std::fmt::Debug for EvmAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAccount")
            .field("private_hex", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Derive the default account from a seed
///
/// SECURITY: The seed should be wrapped in Zeroizing by the caller
pub fn derive_account(seed: &[u8]) -> DerivationResult<EvmAccount> {
    derive_account_at(seed, DEFAULT_DERIVATION_PATH)
}

/// Derive the account at an explicit BIP32 path
pub fn derive_account_at(seed: &[u8], path: &str) -> DerivationResult<EvmAccount> {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, seed)
        .map_err(|e| DerivationError::KeyDerivation(format!("master key: {}", e)))?;
    let path = DerivationPath::from_str(path)
        .map_err(|e| DerivationError::KeyDerivation(format!("derivation path: {}", e)))?;
    let child = master
        .derive_priv(&secp, &path)
        .map_err(|e| DerivationError::KeyDerivation(format!("child key: {}", e)))?;

    Ok(account_from_secret(&secp, &child.private_key))
}

/// Recompute the checksummed address for a hex private key
pub fn address_from_private_key(private_hex: &str) -> DerivationResult<String> {
    let clean = private_hex.strip_prefix("0x").unwrap_or(private_hex);
    let bytes = zeroize::Zeroizing::new(
        hex::decode(clean)
            .map_err(|e| DerivationError::KeyDerivation(format!("private key hex: {}", e)))?,
    );
    let secret_key = SecretKey::from_slice(&bytes)
        .map_err(|e| DerivationError::KeyDerivation(format!("private key: {}", e)))?;

    let secp = Secp256k1::new();
    Ok(account_from_secret(&secp, &secret_key).address.clone())
}

fn account_from_secret(secp: &Secp256k1<All>, secret_key: &SecretKey) -> EvmAccount {
    let private_hex = format!("0x{}", hex::encode(secret_key.secret_bytes()));
    let uncompressed = secret_key.public_key(secp).serialize_uncompressed();
    let public_key_bytes = &uncompressed[1..];

    let address_bytes = keccak256(public_key_bytes);

    EvmAccount {
        private_hex,
        address: to_checksum_address(&address_bytes[12..]),
    }
}
