//! Node Module
//!
//! Endpoint validation, liveness probing and retrying connection
//! acquisition against a set of JSON-RPC nodes.

mod connectivity;
mod endpoint;
mod probe;

pub use connectivity::*;
pub use endpoint::*;
pub use probe::*;

/// Error types for node connectivity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectivityError {
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("No candidate endpoints configured")]
    NoCandidates,

    #[error("All {attempts} connection attempts failed (last error: {last_error})")]
    AllAttemptsFailed { attempts: u32, last_error: String },
}

/// Public BNB Smart Chain dataseed nodes used when no endpoints are configured
pub const DEFAULT_BSC_ENDPOINTS: [&str; 12] = [
    "https://bsc-dataseed1.binance.org/",
    "https://bsc-dataseed2.binance.org/",
    "https://bsc-dataseed3.binance.org/",
    "https://bsc-dataseed4.binance.org/",
    "https://bsc-dataseed1.defibit.io/",
    "https://bsc-dataseed2.defibit.io/",
    "https://bsc-dataseed3.defibit.io/",
    "https://bsc-dataseed4.defibit.io/",
    "https://bsc-dataseed1.ninicoin.io/",
    "https://bsc-dataseed2.ninicoin.io/",
    "https://bsc-dataseed3.ninicoin.io/",
    "https://bsc-dataseed4.ninicoin.io/",
];
