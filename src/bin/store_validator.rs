//! Offline audit of a wallet store file.
//!
//! Re-derives every record from its recovery phrase and checks that the
//! stored key, address and id all agree.

use std::env;
use std::error::Error;
use std::path::PathBuf;
use wallet_forge::wallet::address_from_private_key;
use wallet_forge::{is_checksum_address, restore_from_phrase, verify_id, WalletRecord, WalletStore};

struct ValidationResult {
    name: String,
    success: bool,
    message: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("wallets.json"));

    let records = WalletStore::open(&path).load()?;

    let results: Vec<ValidationResult> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            run_validation(format!("#{} {}", i + 1, record.wallet_id), || {
                validate_record(record)
            })
        })
        .collect();

    println!("================ Wallet Store Validation ================");
    println!("Store: {} ({} records)", path.display(), records.len());
    for result in &results {
        let status = if result.success {
            "✅ PASS"
        } else {
            "❌ FAIL"
        };
        println!("{:<44} {}", result.name, status);
        if !result.success {
            println!("    {}", result.message);
        }
    }

    let overall_success = results.iter().all(|r| r.success);
    println!("=========================================================");
    if overall_success {
        println!("Overall status: ✅ All stored wallets verified");
        Ok(())
    } else {
        println!("Overall status: ❌ Validation failed");
        Err("wallet store validation failed".into())
    }
}

fn run_validation<F>(name: String, f: F) -> ValidationResult
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(_) => ValidationResult {
            name,
            success: true,
            message: String::new(),
        },
        Err(err) => ValidationResult {
            name,
            success: false,
            message: err,
        },
    }
}

fn validate_record(record: &WalletRecord) -> Result<(), String> {
    if !is_checksum_address(&record.public_address) {
        return Err("address is not EIP-55 checksummed".to_string());
    }

    let derived_address =
        address_from_private_key(&record.private_key).map_err(|e| e.to_string())?;
    if derived_address != record.public_address {
        return Err("private key does not match address".to_string());
    }

    let restored = restore_from_phrase(&record.seed_phrase).map_err(|e| e.to_string())?;
    if restored.public_address() != record.public_address {
        return Err("seed phrase derives a different address".to_string());
    }
    let stored_key = record.private_key.trim_start_matches("0x");
    if !restored
        .private_key()
        .trim_start_matches("0x")
        .eq_ignore_ascii_case(stored_key)
    {
        return Err("seed phrase derives a different private key".to_string());
    }

    if !verify_id(record) {
        return Err("wallet id does not match address, timestamp and block".to_string());
    }

    Ok(())
}
