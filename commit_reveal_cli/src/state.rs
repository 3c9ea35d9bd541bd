use crate::Config;
use commit_reveal::{Clock, Ledger, Receipt, SystemClock, Transaction};
use fs2::FileExt;
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// An exclusive advisory lock on `<ledger>.lock`, released when dropped.
///
/// The ledger file itself is replaced by rename on save, so the lock lives
/// on a sidecar file that is never replaced.
pub struct LedgerLock {
    _file: File,
}

/// Block until no other process is updating the ledger at `path`
pub fn lock_ledger(cmd: &str, path: &str) -> LedgerLock {
    let lock_path = format!("{}.lock", path);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to open {}: {}", lock_path, e)));

    file.lock_exclusive()
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to lock {}: {}", lock_path, e)));
    debug!("locked {}", lock_path);

    LedgerLock { _file: file }
}

/// Lock the ledger and load it, for a load, apply and save cycle.
///
/// Keep the returned lock alive until the ledger has been saved.
pub fn load_ledger_for_update(cmd: &str, path: &str) -> (LedgerLock, Ledger) {
    let lock = lock_ledger(cmd, path);
    let ledger = load_ledger(cmd, path);
    (lock, ledger)
}

/// Load the ledger snapshot, starting an empty ledger if the file does not exist yet
pub fn load_ledger(cmd: &str, path: &str) -> Ledger {
    if !Path::new(path).exists() {
        info!("no ledger at {}, starting a new one", path);
        return Ledger::new();
    }

    let file_bytes = std::fs::read(path)
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to read {}: {}", path, e)));

    Ledger::from_bytes(&file_bytes)
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to load {}: {}", path, e)))
}

/// Write the ledger snapshot as JSON, replacing the old file in one rename
pub fn save_ledger(cmd: &str, path: &str, ledger: &Ledger) {
    let json = ledger.to_json().unwrap_or_else(|e| crate::fail(cmd, e));

    let tmp_path = format!("{}.tmp", path);
    std::fs::write(&tmp_path, json)
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to write {}: {}", tmp_path, e)));
    std::fs::rename(&tmp_path, path)
        .unwrap_or_else(|e| crate::fail(cmd, format!("unable to write {}: {}", path, e)));

    debug!("saved ledger to {}", path);
}

/// Sign a transaction as the configured identity, apply it and save the ledger.
///
/// `ledger` must come from `load_ledger_for_update` with its lock still held.
pub fn submit<T: Into<Transaction>>(
    cmd: &str,
    config: &Config,
    ledger: &mut Ledger,
    tx: T,
    print_tx: bool,
) -> Receipt {
    let signed = tx
        .into()
        .sign(config.signer(cmd))
        .unwrap_or_else(|e| crate::fail(cmd, e));

    if print_tx {
        let tx_json = serde_json::to_string_pretty(&signed).unwrap_or_else(|e| crate::fail(cmd, e));
        println!("{}", tx_json);
    }

    let receipt = ledger
        .apply(&signed, SystemClock.now())
        .unwrap_or_else(|e| crate::fail(cmd, e));

    save_ledger(cmd, &config.ledger_path, ledger);
    receipt
}
