//! Generator Configuration
//!
//! All settings live in one explicit struct passed to the generator. It can
//! be loaded from a JSON file and is then overridden by command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ForgeError, ForgeResult};
use crate::node::{RetryPolicy, RpcEndpoint, DEFAULT_BSC_ENDPOINTS};
use crate::types::WordCount;

/// Upper bound on wallets per run
pub const MAX_WALLETS_PER_RUN: u32 = 10_000;

/// Settings for a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Candidate JSON-RPC endpoints
    pub endpoints: Vec<String>,
    /// Wallets to generate
    pub wallet_count: u32,
    /// Recovery phrase length
    pub word_count: WordCount,
    /// Probe attempts per wallet before it is skipped
    pub max_attempts: u32,
    /// Pause between failed probes
    pub backoff_ms: u64,
    /// Pause between two wallets
    pub pacing_ms: u64,
    /// HTTP timeout of one probe
    pub request_timeout_secs: u64,
    /// Wallet store file
    pub store_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_BSC_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            wallet_count: 1,
            word_count: WordCount::Words12,
            max_attempts: 3,
            backoff_ms: 1_000,
            pacing_ms: 100,
            request_timeout_secs: 10,
            store_path: PathBuf::from("wallets.json"),
        }
    }
}

impl GeneratorConfig {
    /// Load settings from a JSON file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> ForgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::invalid_config(format!("Cannot read config file {}", path.display()))
                .with_details(e.to_string())
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ForgeResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            ForgeError::invalid_config("Invalid config file").with_details(e.to_string())
        })
    }

    /// Check every constraint, including each endpoint's URL form
    pub fn validate(&self) -> ForgeResult<()> {
        if self.endpoints.is_empty() {
            return Err(ForgeError::invalid_config("At least one RPC endpoint is required"));
        }
        if self.wallet_count == 0 {
            return Err(ForgeError::invalid_config("Wallet count must be a positive integer"));
        }
        if self.wallet_count > MAX_WALLETS_PER_RUN {
            return Err(ForgeError::invalid_config(format!(
                "Wallet count {} exceeds the per-run limit of {}",
                self.wallet_count, MAX_WALLETS_PER_RUN
            )));
        }
        if self.max_attempts == 0 {
            return Err(ForgeError::invalid_config("max_attempts must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ForgeError::invalid_config("request_timeout_secs must be at least 1"));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ForgeError::invalid_config("store_path must not be empty"));
        }

        for endpoint in &self.endpoints {
            RpcEndpoint::parse(endpoint)?;
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
