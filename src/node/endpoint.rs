//! RPC Endpoint Validation
//!
//! An endpoint must be an absolute `http`/`https` URL made of scheme, host,
//! optional port and optional path. Anything else is rejected before any
//! network I/O happens.

use std::fmt;
use std::str::FromStr;
use url::Url;

use super::ConnectivityError;

/// Maximum accepted URL length
const MAX_URL_LENGTH: usize = 2048;

/// A validated JSON-RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RpcEndpoint {
    url: Url,
}

impl RpcEndpoint {
    /// Validate `input` against the endpoint URL grammar
    pub fn parse(input: &str) -> Result<Self, ConnectivityError> {
        let trimmed = input.trim();
        let invalid = |reason: &str| ConnectivityError::InvalidEndpoint {
            url: trimmed.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty URL"));
        }
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(invalid("URL too long"));
        }
        if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(invalid("URL contains whitespace or control characters"));
        }

        let mut url = Url::parse(trimmed).map_err(|e| invalid(&format!("Invalid URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(&format!("URL scheme '{}' is not allowed", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("URL has no host"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            // Never echo credentials back in the error
            let _ = url.set_username("");
            let _ = url.set_password(None);
            return Err(ConnectivityError::InvalidEndpoint {
                url: url.to_string(),
                reason: "URLs with embedded credentials are not allowed".to_string(),
            });
        }
        if url.query().is_some() {
            return Err(invalid("query strings are not allowed"));
        }
        if url.fragment().is_some() {
            return Err(invalid("fragments are not allowed"));
        }

        Ok(Self { url })
    }

    /// Normalized URL string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for RpcEndpoint {
    type Err = ConnectivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
