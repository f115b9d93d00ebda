//! Node Connectivity Manager
//!
//! Picks a random candidate endpoint per attempt, validates it, probes it
//! for the chain head and retries with a fixed backoff.

use rand::Rng;
use std::thread;
use std::time::Duration;

use super::{ConnectivityError, NodeProbe, RpcEndpoint};
use crate::{log_debug, log_info, log_warn};

const LOG_MODULE: &str = "node";

/// Retry discipline for acquiring a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total probe attempts, including the first one
    pub max_attempts: u32,
    /// Pause between two failed attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// A node that answered its liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConnection {
    endpoint: RpcEndpoint,
    reachable: bool,
    latest_block_height: Option<u64>,
}

impl NodeConnection {
    fn live(endpoint: RpcEndpoint, height: u64) -> Self {
        Self {
            endpoint,
            reachable: true,
            latest_block_height: Some(height),
        }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn latest_block_height(&self) -> Option<u64> {
        self.latest_block_height
    }

    /// Height reported by the probe (0 only if the node never reported one,
    /// which a live connection cannot be built from)
    pub fn block_number(&self) -> u64 {
        self.latest_block_height.unwrap_or_default()
    }
}

/// Owns the candidate endpoints, retry policy and probe
pub struct ConnectivityManager<P> {
    candidates: Vec<String>,
    policy: RetryPolicy,
    probe: P,
}

impl<P: NodeProbe> ConnectivityManager<P> {
    pub fn new(candidates: Vec<String>, policy: RetryPolicy, probe: P) -> Self {
        Self {
            candidates,
            policy,
            probe,
        }
    }

    pub fn acquire_connection(&self) -> Result<NodeConnection, ConnectivityError> {
        acquire_connection(
            &self.candidates,
            self.policy.max_attempts,
            self.policy.backoff,
            &self.probe,
        )
    }
}

/// Obtain a live node from `candidates`
///
/// Every attempt draws a fresh endpoint uniformly at random. Drawing a
/// malformed candidate is a failed attempt that makes no network call; the
/// candidate is dropped for the rest of the call and, when none are left,
/// its validation error is returned. `backoff` is slept between failed
/// probes, never after the last one.
pub fn acquire_connection<P: NodeProbe + ?Sized>(
    candidates: &[String],
    max_attempts: u32,
    backoff: Duration,
    probe: &P,
) -> Result<NodeConnection, ConnectivityError> {
    if candidates.is_empty() {
        return Err(ConnectivityError::NoCandidates);
    }

    let mut pool: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let mut rng = rand::thread_rng();
    let mut attempts = 0u32;
    let mut last_error = String::from("no attempts permitted");

    while attempts < max_attempts {
        let index = rng.gen_range(0..pool.len());
        let endpoint = match RpcEndpoint::parse(pool[index]) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                attempts += 1;
                log_warn!(
                    LOG_MODULE,
                    "Discarding malformed endpoint",
                    attempt = attempts,
                    max_attempts = max_attempts,
                    reason = err,
                );
                pool.swap_remove(index);
                if pool.is_empty() {
                    return Err(err);
                }
                last_error = err.to_string();
                continue;
            }
        };

        attempts += 1;
        log_debug!(
            LOG_MODULE,
            "Probing node",
            node_url = endpoint,
            attempt = attempts,
            max_attempts = max_attempts,
        );

        match probe.latest_block(&endpoint) {
            Ok(Some(height)) => {
                log_info!(LOG_MODULE, "Connected to node", node_url = endpoint, block = height);
                return Ok(NodeConnection::live(endpoint, height));
            }
            Ok(None) => {
                last_error = format!("{} reported no block height", endpoint);
            }
            Err(err) => {
                last_error = format!("{}: {}", endpoint, err);
            }
        }

        log_warn!(
            LOG_MODULE,
            "Node probe failed",
            attempt = attempts,
            max_attempts = max_attempts,
            error = last_error,
        );

        if attempts < max_attempts && !backoff.is_zero() {
            thread::sleep(backoff);
        }
    }

    Err(ConnectivityError::AllAttemptsFailed {
        attempts,
        last_error,
    })
}
