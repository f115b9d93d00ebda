//! Key Generation
//!
//! Creates wallets from fresh entropy or from an existing BIP39 phrase.
//!
//! SECURITY: All sensitive data (entropy, seeds) is zeroized on drop.

use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::derivation::{self, EvmAccount};
use super::{DerivationError, DerivationResult};
use crate::types::WordCount;

/// Ordered BIP39 words of a recovery phrase
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MnemonicPhrase {
    words: Vec<String>,
}

impl MnemonicPhrase {
    fn from_mnemonic(mnemonic: &Mnemonic) -> Self {
        let phrase = Zeroizing::new(mnemonic.to_string());
        Self {
            words: phrase.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Space-joined phrase, the form stored in wallet records
    pub fn joined(&self) -> String {
        self.words.join(" ")
    }
}

impl std::fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MnemonicPhrase([REDACTED; {} words])", self.words.len())
    }
}

/// Keypair and recovery phrase of a freshly generated wallet
#[derive(Clone, Debug)]
pub struct GeneratedWallet {
    account: EvmAccount,
    mnemonic: MnemonicPhrase,
}

impl GeneratedWallet {
    pub fn private_key(&self) -> &str {
        &self.account.private_hex
    }

    pub fn public_address(&self) -> &str {
        &self.account.address
    }

    pub fn mnemonic(&self) -> &MnemonicPhrase {
        &self.mnemonic
    }
}

/// Create a new wallet from OS entropy
pub fn generate_wallet(strength: WordCount) -> DerivationResult<GeneratedWallet> {
    generate_wallet_with_rng(&mut OsRng, strength)
}

/// Create a new wallet for a raw entropy size in bits
/// (one of 128, 160, 192, 224, 256)
pub fn generate_wallet_for_bits(entropy_bits: usize) -> DerivationResult<GeneratedWallet> {
    let strength = WordCount::from_entropy_bits(entropy_bits)
        .ok_or(DerivationError::UnsupportedStrength(entropy_bits))?;
    generate_wallet(strength)
}

/// Create a new wallet drawing entropy from `rng`
///
/// A failing entropy source is fatal and is not retried.
pub fn generate_wallet_with_rng<R: RngCore + ?Sized>(
    rng: &mut R,
    strength: WordCount,
) -> DerivationResult<GeneratedWallet> {
    let mut entropy = Zeroizing::new(vec![0u8; strength.entropy_bytes()]);
    rng.try_fill_bytes(entropy.as_mut_slice())
        .map_err(|e| DerivationError::EntropyUnavailable(e.to_string()))?;

    derive_from_entropy(&entropy)
}

/// Deterministically build a wallet from raw entropy
pub fn derive_from_entropy(entropy: &[u8]) -> DerivationResult<GeneratedWallet> {
    if WordCount::from_entropy_bits(entropy.len() * 8).is_none() {
        return Err(DerivationError::UnsupportedStrength(entropy.len() * 8));
    }
    let mnemonic = Mnemonic::from_entropy(entropy)
        .map_err(|e| DerivationError::Mnemonic(format!("Failed to create mnemonic: {}", e)))?;
    wallet_from_mnemonic(&mnemonic)
}

/// Restore a wallet from its recovery phrase (no passphrase)
pub fn restore_from_phrase(phrase: &str) -> DerivationResult<GeneratedWallet> {
    let mnemonic = Mnemonic::parse(phrase)
        .map_err(|e| DerivationError::Mnemonic(format!("Invalid mnemonic: {}", e)))?;
    wallet_from_mnemonic(&mnemonic)
}

fn wallet_from_mnemonic(mnemonic: &Mnemonic) -> DerivationResult<GeneratedWallet> {
    // Seed is 64 bytes - wrap in Zeroizing for automatic cleanup
    let seed = Zeroizing::new(mnemonic.to_seed(""));
    let account = derivation::derive_account(seed.as_ref())?;

    Ok(GeneratedWallet {
        account,
        mnemonic: MnemonicPhrase::from_mnemonic(mnemonic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_checksum_address;

    struct DeadRng;

    impl RngCore for DeadRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy pool closed",
            )))
        }
    }

    #[test]
    fn test_create_wallet() {
        let wallet = generate_wallet(WordCount::Words12).unwrap();
        assert_eq!(wallet.mnemonic().word_count(), 12);
        assert!(is_checksum_address(wallet.public_address()));
        assert_eq!(wallet.private_key().len(), 66);
    }

    #[test]
    fn test_every_strength_maps_to_word_count() {
        for (bits, words) in [(128, 12), (160, 15), (192, 18), (224, 21), (256, 24)] {
            let wallet = generate_wallet_for_bits(bits).unwrap();
            assert_eq!(wallet.mnemonic().word_count(), words, "{} bits", bits);
        }
    }

    #[test]
    fn test_unsupported_strength() {
        assert!(matches!(
            generate_wallet_for_bits(100),
            Err(DerivationError::UnsupportedStrength(100))
        ));
        assert!(matches!(
            derive_from_entropy(&[0u8; 8]),
            Err(DerivationError::UnsupportedStrength(64))
        ));
    }

    #[test]
    fn test_bip39_vector() {
        let wallet = derive_from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(
            wallet.mnemonic().joined(),
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
        assert_eq!(
            wallet.public_address(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
    }

    #[test]
    fn test_restore_matches_generated() {
        let wallet = generate_wallet(WordCount::Words24).unwrap();
        let restored = restore_from_phrase(&wallet.mnemonic().joined()).unwrap();
        assert_eq!(restored.private_key(), wallet.private_key());
        assert_eq!(restored.public_address(), wallet.public_address());
    }

    #[test]
    fn test_entropy_failure_is_surfaced() {
        let err = generate_wallet_with_rng(&mut DeadRng, WordCount::Words12).unwrap_err();
        assert!(matches!(err, DerivationError::EntropyUnavailable(_)));
    }

    #[test]
    fn test_debug_hides_phrase() {
        let wallet = derive_from_entropy(&[0u8; 16]).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains("abandon"));
    }
}
