//! Wallet Identity
//!
//! A wallet id is a name-based (v5) UUID over
//! `address|created_at|block_number`, so the same inputs always give the
//! same id and an id can be recomputed from a stored record for auditing.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::types::WalletRecord;

/// Namespace all wallet ids are derived under
pub const WALLET_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a8e_94d3_5b07_a1e4_3c5d_7f90_b2e6);

const SEPARATOR: char = '|';

/// Canonical string hashed into the wallet id
pub fn canonical_identity(public_address: &str, created_at: &DateTime<Utc>, block_number: u64) -> String {
    format!(
        "{addr}{sep}{ts}{sep}{block}",
        addr = public_address,
        ts = created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        block = block_number,
        sep = SEPARATOR,
    )
}

/// Compute the wallet id for an address, creation time and block number
pub fn assign_id(public_address: &str, created_at: &DateTime<Utc>, block_number: u64) -> String {
    let canonical = canonical_identity(public_address, created_at, block_number);
    Uuid::new_v5(&WALLET_ID_NAMESPACE, canonical.as_bytes()).to_string()
}

/// Recompute a stored record's id and compare
pub fn verify_id(record: &WalletRecord) -> bool {
    assign_id(&record.public_address, &record.created_at, record.block_number) == record.wallet_id
}
