//! Generation Orchestrator
//!
//! Runs one wallet at a time through
//! `SelectingNode -> Deriving -> Identifying -> Persisting -> Done`.
//! A wallet whose node cannot be acquired ends in `Skipped`; entropy and
//! storage failures end the wallet's pipeline and are recorded as failures.
//! Either way the run moves on to the next wallet after the pacing interval.

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::config::GeneratorConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::identity::assign_id;
use crate::node::{ConnectivityManager, NodeConnection, NodeProbe};
use crate::store::{AppendOutcome, WalletStore};
use crate::types::{utc_now_seconds, WalletRecord, WordCount};
use crate::wallet::generate_wallet;
use crate::{log_error, log_info, log_warn};

const LOG_MODULE: &str = "orchestrator";

/// Pipeline position of one wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStage {
    SelectingNode,
    Deriving,
    Identifying,
    Persisting,
    Done,
    Skipped,
}

impl fmt::Display for WalletStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletStage::SelectingNode => "selecting-node",
            WalletStage::Deriving => "deriving",
            WalletStage::Identifying => "identifying",
            WalletStage::Persisting => "persisting",
            WalletStage::Done => "done",
            WalletStage::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// Public summary of a stored wallet (no key material)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSummary {
    pub index: u32,
    pub wallet_id: String,
    pub public_address: String,
    pub block_number: u64,
    pub node_url: String,
    pub store_reinitialized: bool,
}

/// Final state of one wallet's pipeline
#[derive(Debug, Clone)]
pub enum WalletOutcome {
    Done(GeneratedSummary),
    Skipped { index: u32, reason: String },
    Failed { index: u32, stage: WalletStage, error: ForgeError },
}

/// Progress notifications for the caller's output
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Connected {
        index: u32,
        total: u32,
        node_url: String,
        block_number: u64,
    },
    Finished {
        total: u32,
        outcome: WalletOutcome,
    },
}

/// Result of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub requested: u32,
    pub generated: Vec<GeneratedSummary>,
    pub skipped: Vec<(u32, String)>,
    pub failed: Vec<(u32, WalletStage, ForgeError)>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.generated.len() == self.requested as usize
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    fn record(&mut self, outcome: WalletOutcome) {
        match outcome {
            WalletOutcome::Done(summary) => self.generated.push(summary),
            WalletOutcome::Skipped { index, reason } => self.skipped.push((index, reason)),
            WalletOutcome::Failed {
                index,
                stage,
                error,
            } => self.failed.push((index, stage, error)),
        }
    }
}

/// Drives wallet generation for a configured run
pub struct Generator<P> {
    connectivity: ConnectivityManager<P>,
    store: WalletStore,
    word_count: WordCount,
    wallet_count: u32,
    pacing: Duration,
}

impl<P: NodeProbe> Generator<P> {
    /// Validate `config` and build a generator probing nodes with `probe`
    pub fn new(config: &GeneratorConfig, probe: P) -> ForgeResult<Self> {
        config.validate()?;

        Ok(Self {
            connectivity: ConnectivityManager::new(
                config.endpoints.clone(),
                config.retry_policy(),
                probe,
            ),
            store: WalletStore::open(config.store_path.clone()),
            word_count: config.word_count,
            wallet_count: config.wallet_count,
            pacing: config.pacing(),
        })
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Generate all requested wallets, reporting progress to `observer`
    pub fn run<F>(&self, mut observer: F) -> RunSummary
    where
        F: FnMut(&ProgressEvent),
    {
        let total = self.wallet_count;
        let mut summary = RunSummary {
            requested: total,
            ..RunSummary::default()
        };

        for index in 1..=total {
            let outcome = self.generate_one(index, &mut observer);
            observer(&ProgressEvent::Finished {
                total,
                outcome: outcome.clone(),
            });
            summary.record(outcome);

            if index < total && !self.pacing.is_zero() {
                thread::sleep(self.pacing);
            }
        }

        log_info!(
            LOG_MODULE,
            "Generation run finished",
            requested = total,
            generated = summary.generated.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
        );

        summary
    }

    /// Run a single wallet through the pipeline
    pub fn generate_one<F>(&self, index: u32, observer: &mut F) -> WalletOutcome
    where
        F: FnMut(&ProgressEvent),
    {
        let mut stage = WalletStage::SelectingNode;

        let connection = match self.connectivity.acquire_connection() {
            Ok(connection) => connection,
            Err(err) => {
                log_warn!(
                    LOG_MODULE,
                    "Skipping wallet, no node available",
                    wallet_index = index,
                    error = err,
                );
                return WalletOutcome::Skipped {
                    index,
                    reason: err.to_string(),
                };
            }
        };
        observer(&ProgressEvent::Connected {
            index,
            total: self.wallet_count,
            node_url: connection.endpoint().to_string(),
            block_number: connection.block_number(),
        });

        stage = self.advance(stage, WalletStage::Deriving);
        let wallet = match generate_wallet(self.word_count) {
            Ok(wallet) => wallet,
            Err(err) => return self.fail(index, stage, err.into()),
        };

        stage = self.advance(stage, WalletStage::Identifying);
        let record = build_record(&connection, &wallet);

        stage = self.advance(stage, WalletStage::Persisting);
        let summary = GeneratedSummary {
            index,
            wallet_id: record.wallet_id.clone(),
            public_address: record.public_address.clone(),
            block_number: record.block_number,
            node_url: record.node_url.clone(),
            store_reinitialized: false,
        };
        let outcome = match self.store.append(record) {
            Ok(outcome) => outcome,
            Err(err) => return self.fail(index, stage, err.into()),
        };

        self.advance(stage, WalletStage::Done);
        log_info!(
            LOG_MODULE,
            "Wallet generated",
            wallet_index = index,
            wallet_id = summary.wallet_id,
            public_address = summary.public_address,
            block = summary.block_number,
        );

        WalletOutcome::Done(GeneratedSummary {
            store_reinitialized: matches!(outcome, AppendOutcome::Reinitialized { .. }),
            ..summary
        })
    }

    fn advance(&self, from: WalletStage, to: WalletStage) -> WalletStage {
        crate::log_debug!(LOG_MODULE, "Stage transition", from = from, to = to);
        to
    }

    fn fail(&self, index: u32, stage: WalletStage, error: ForgeError) -> WalletOutcome {
        log_error!(
            LOG_MODULE,
            "Wallet pipeline aborted",
            wallet_index = index,
            stage = stage,
            error = error,
        );
        WalletOutcome::Failed {
            index,
            stage,
            error,
        }
    }
}

/// Stamp a freshly derived wallet with time, block and id
pub fn build_record(connection: &NodeConnection, wallet: &crate::wallet::GeneratedWallet) -> WalletRecord {
    let created_at = utc_now_seconds();
    let block_number = connection.block_number();
    let public_address = wallet.public_address().to_string();

    WalletRecord {
        wallet_id: assign_id(&public_address, &created_at, block_number),
        private_key: wallet.private_key().to_string(),
        public_address,
        seed_phrase: wallet.mnemonic().joined(),
        created_at,
        block_number,
        node_url: connection.endpoint().to_string(),
    }
}
