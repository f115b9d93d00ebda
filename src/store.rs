//! Wallet Persistence Store
//!
//! Keeps generated wallets in a single JSON array file. Every append reads
//! the whole array, adds one record and writes the array back through a
//! temp file that is renamed over the original, so readers only ever see
//! the old or the new complete file. Existing entries are written back
//! exactly as they were read; only the new record uses the current layout.
//!
//! An unparseable file is treated as corrupt: a copy is kept next to it as
//! `<file>.corrupt` (or `<file>.corrupt.N` when earlier backups exist) and
//! the store restarts from the record being appended.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::WalletRecord;
use crate::{log_debug, log_warn};

const LOG_MODULE: &str = "store";

/// Mode given to newly created store files
#[cfg(unix)]
const NEW_STORE_MODE: u32 = 0o600;

/// Error types for the wallet store
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Wallet store {} is corrupt: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Access denied to wallet store {}", path.display())]
    AccessDenied { path: PathBuf },

    #[error("Wallet id {0} already exists in the store")]
    DuplicateWalletId(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize wallet store: {0}")]
    Serialize(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// What an append did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Record added after the existing ones
    Appended { total: usize },
    /// Prior content was corrupt and has been replaced by the new record
    Reinitialized {
        reason: String,
        backup: Option<PathBuf>,
    },
}

impl AppendOutcome {
    pub fn is_reinitialized(&self) -> bool {
        matches!(self, AppendOutcome::Reinitialized { .. })
    }
}

/// Append-only JSON array of wallet records
#[derive(Debug)]
pub struct WalletStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl WalletStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records in append order; a missing file is an empty store
    pub fn load(&self) -> PersistenceResult<Vec<WalletRecord>> {
        Ok(self
            .read_entries()?
            .into_iter()
            .map(|entry| entry.record)
            .collect())
    }

    /// Parse the file into entries, keeping each one's JSON as stored
    fn read_entries(&self) -> PersistenceResult<Vec<StoredEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let raw: Vec<Value> =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;

        raw.into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let record = WalletRecord::deserialize(&raw)
                    .map_err(|e| self.corrupt(format!("entry {}: {}", i, e)))?;
                Ok(StoredEntry { raw, record })
            })
            .collect()
    }

    /// Number of records currently stored
    pub fn count(&self) -> PersistenceResult<usize> {
        self.load().map(|records| records.len())
    }

    /// Durably append one record
    ///
    /// Callers are serialized by an in-process lock. A corrupt store is
    /// recovered (see [`AppendOutcome::Reinitialized`]); permission problems
    /// leave the existing file untouched.
    pub fn append(&self, record: WalletRecord) -> PersistenceResult<AppendOutcome> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let permissions = self.existing_permissions()?;

        let (entries, recovered) = match self.read_entries() {
            Ok(entries) => (entries, None),
            Err(PersistenceError::CorruptStore { reason, .. }) => {
                let backup = self.backup_corrupt();
                log_warn!(
                    LOG_MODULE,
                    "Wallet store is corrupt; previous records are no longer readable from it",
                    path = self.path.display(),
                    reason = reason,
                    backup = backup
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "none".to_string()),
                );
                (Vec::new(), Some((reason, backup)))
            }
            Err(e) => return Err(e),
        };

        if entries.iter().any(|e| e.record.wallet_id == record.wallet_id) {
            return Err(PersistenceError::DuplicateWalletId(record.wallet_id));
        }

        let mut raw: Vec<Value> = entries.into_iter().map(|e| e.raw).collect();
        raw.push(
            serde_json::to_value(&record).map_err(|e| PersistenceError::Serialize(e.to_string()))?,
        );
        self.write_all(&raw, permissions)?;

        log_debug!(
            LOG_MODULE,
            "Appended wallet record",
            wallet_id = record.wallet_id,
            total = raw.len(),
        );

        Ok(match recovered {
            None => AppendOutcome::Appended { total: raw.len() },
            Some((reason, backup)) => AppendOutcome::Reinitialized { reason, backup },
        })
    }

    /// Permissions of the current file, refusing one the user marked read-only
    fn existing_permissions(&self) -> PersistenceResult<Option<Permissions>> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.permissions().readonly() => Err(PersistenceError::AccessDenied {
                path: self.path.clone(),
            }),
            Ok(meta) => Ok(Some(meta.permissions())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Replace the file with `entries`, keeping its permissions
    fn write_all(&self, entries: &[Value], permissions: Option<Permissions>) -> PersistenceResult<()> {
        let data = to_json_indented(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.sibling_path("tmp");
        let written = open_temp(&temp_path).and_then(|mut file| {
            match permissions {
                Some(permissions) => file.set_permissions(permissions)?,
                None => restrict_new_store(&file)?,
            }
            file.write_all(&data)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&temp_path, &self.path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }

        Ok(())
    }

    /// Best-effort copy of a corrupt store before it is overwritten
    ///
    /// Earlier backups are never replaced: the first free name out of
    /// `<file>.corrupt`, `<file>.corrupt.1`, `<file>.corrupt.2`, ... is used.
    fn backup_corrupt(&self) -> Option<PathBuf> {
        let backup_path = (0u32..)
            .map(|n| match n {
                0 => self.sibling_path("corrupt"),
                n => self.sibling_path(&format!("corrupt.{}", n)),
            })
            .find(|candidate| !candidate.exists())?;
        match fs::copy(&self.path, &backup_path) {
            Ok(_) => Some(backup_path),
            Err(e) => {
                log_warn!(LOG_MODULE, "Failed to back up corrupt wallet store", error = e);
                None
            }
        }
    }

    /// `<file name>.<suffix>` in the same directory as the store
    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "wallets.json".into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: String) -> PersistenceError {
        PersistenceError::CorruptStore {
            path: self.path.clone(),
            reason,
        }
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        if source.kind() == io::ErrorKind::PermissionDenied {
            PersistenceError::AccessDenied {
                path: self.path.clone(),
            }
        } else {
            PersistenceError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }
}

/// One stored entry: its JSON as found in the file and the parsed record
struct StoredEntry {
    raw: Value,
    record: WalletRecord,
}

fn open_temp(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(NEW_STORE_MODE);
    }
    options.open(path)
}

/// Owner-only access for a store file that did not exist before
#[cfg(unix)]
fn restrict_new_store(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(Permissions::from_mode(NEW_STORE_MODE))
}

#[cfg(not(unix))]
fn restrict_new_store(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Serialize with four-space indentation, the layout existing wallet files use
fn to_json_indented(entries: &[Value]) -> PersistenceResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(n: u64) -> WalletRecord {
        WalletRecord {
            wallet_id: format!("wallet-{}", n),
            private_key: format!("0x{:064x}", n + 1),
            public_address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".to_string(),
            seed_phrase: "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, n as u32 % 60).unwrap(),
            block_number: 1_000 + n,
            node_url: "https://bsc-dataseed1.binance.org/".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("wallets.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_reload_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("wallets.json"));

        let appended: Vec<WalletRecord> = (0..5).map(record).collect();
        for (i, r) in appended.iter().enumerate() {
            let outcome = store.append(r.clone()).unwrap();
            assert_eq!(outcome, AppendOutcome::Appended { total: i + 1 });
        }

        assert_eq!(store.load().unwrap(), appended);
        assert!(!dir.path().join("wallets.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_store_is_reinitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, b"[{\"wallet_id\": \"trunc").unwrap();

        let store = WalletStore::open(&path);
        let outcome = store.append(record(1)).unwrap();
        assert!(outcome.is_reinitialized());

        assert_eq!(store.load().unwrap(), vec![record(1)]);
        let backup = dir.path().join("wallets.json.corrupt");
        assert_eq!(fs::read(backup).unwrap(), b"[{\"wallet_id\": \"trunc");
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, br#"{"wallets": []}"#).unwrap();

        let store = WalletStore::open(&path);
        assert!(matches!(
            store.load(),
            Err(PersistenceError::CorruptStore { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("wallets.json"));
        store.append(record(3)).unwrap();
        assert!(matches!(
            store.append(record(3)),
            Err(PersistenceError::DuplicateWalletId(_))
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_read_only_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let store = WalletStore::open(&path);
        store.append(record(1)).unwrap();
        let before = fs::read(&path).unwrap();

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        assert!(matches!(
            store.append(record(2)),
            Err(PersistenceError::AccessDenied { .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("nested/out/wallets.json"));
        store.append(record(1)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_file_layout_is_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let store = WalletStore::open(&path);
        store.append(record(1)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let entry = &value.as_array().unwrap()[0];
        for key in [
            "wallet_id",
            "private_key",
            "public_address",
            "seed_phrase",
            "created_at",
            "block_number",
            "node_url",
        ] {
            assert!(entry.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(entry["created_at"], "2024-01-01T00:00:01Z");
    }

    #[test]
    fn test_second_corruption_keeps_first_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let store = WalletStore::open(&path);

        fs::write(&path, b"first garbage").unwrap();
        store.append(record(1)).unwrap();
        fs::write(&path, b"second garbage").unwrap();
        match store.append(record(2)).unwrap() {
            AppendOutcome::Reinitialized { backup, .. } => {
                assert_eq!(backup, Some(dir.path().join("wallets.json.corrupt.1")))
            }
            other => panic!("expected reinitialization, got {:?}", other),
        }
        assert_eq!(
            fs::read(dir.path().join("wallets.json.corrupt")).unwrap(),
            b"first garbage"
        );
        assert_eq!(
            fs::read(dir.path().join("wallets.json.corrupt.1")).unwrap(),
            b"second garbage"
        );
    }

    #[test]
    fn test_legacy_entries_are_written_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let legacy = serde_json::json!({
            "wallet_id": -123,
            "private_key": "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            "public_address": "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
            "seed_phrase": "abandon abandon abandon",
            "timestamp": "2023-11-20 18:42:07",
            "block_number": 33615012,
            "node_url": "https://bsc-dataseed2.defibit.io/"
        });
        fs::write(&path, serde_json::to_vec(&vec![legacy.clone()]).unwrap()).unwrap();

        let store = WalletStore::open(&path);
        assert_eq!(
            store.append(record(1)).unwrap(),
            AppendOutcome::Appended { total: 2 }
        );

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries[0], legacy);
        let keys: Vec<&String> = entries[0].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "wallet_id");
        assert_eq!(keys[4], "timestamp");
        assert_eq!(entries[1]["wallet_id"], "wallet-1");
        assert_eq!(store.load().unwrap()[0].wallet_id, "-123");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        WalletStore::open(&path).append(record(1)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_append_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let store = WalletStore::open(&path);
        store.append(record(1)).unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        store.append(record(2)).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        store.append(record(3)).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
