//! Unified error types for wallet-forge
//!
//! Component modules define their own `thiserror` enums; all of them
//! convert into [`ForgeError`] so the orchestrator and binaries can report
//! failures with a stable error code.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::ConnectivityError;
use crate::store::PersistenceError;
use crate::wallet::DerivationError;

/// Main error type for all wallet-forge operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ForgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ForgeError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidConfig,
    InvalidEndpoint,
    InvalidMnemonic,

    // Network errors
    NodeUnavailable,
    NetworkError,

    // Crypto errors
    EntropyUnavailable,
    CryptoError,

    // Storage errors
    CorruptStore,
    AccessDenied,
    DuplicateWalletId,
    StorageError,

    // Parse errors
    ParseError,
    JsonError,

    // Internal
    Internal,
}

/// Result type alias for wallet-forge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

// Conversions from component and common error types

impl From<ConnectivityError> for ForgeError {
    fn from(e: ConnectivityError) -> Self {
        let code = match e {
            ConnectivityError::InvalidEndpoint { .. } => ErrorCode::InvalidEndpoint,
            ConnectivityError::NoCandidates => ErrorCode::InvalidConfig,
            ConnectivityError::AllAttemptsFailed { .. } => ErrorCode::NodeUnavailable,
        };
        ForgeError::new(code, e.to_string())
    }
}

impl From<DerivationError> for ForgeError {
    fn from(e: DerivationError) -> Self {
        let code = match e {
            DerivationError::EntropyUnavailable(_) => ErrorCode::EntropyUnavailable,
            DerivationError::UnsupportedStrength(_) => ErrorCode::InvalidConfig,
            DerivationError::Mnemonic(_) => ErrorCode::InvalidMnemonic,
            DerivationError::KeyDerivation(_) => ErrorCode::CryptoError,
        };
        ForgeError::new(code, e.to_string())
    }
}

impl From<PersistenceError> for ForgeError {
    fn from(e: PersistenceError) -> Self {
        let code = match e {
            PersistenceError::CorruptStore { .. } => ErrorCode::CorruptStore,
            PersistenceError::AccessDenied { .. } => ErrorCode::AccessDenied,
            PersistenceError::DuplicateWalletId(_) => ErrorCode::DuplicateWalletId,
            PersistenceError::Io { .. } | PersistenceError::Serialize(_) => ErrorCode::StorageError,
        };
        ForgeError::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(e: serde_json::Error) -> Self {
        ForgeError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(e: std::io::Error) -> Self {
        ForgeError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ForgeError::new(ErrorCode::NetworkError, "Request timed out")
        } else if e.is_connect() {
            ForgeError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            ForgeError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}
