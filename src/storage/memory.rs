//! In-memory storage
//!
//! Clones share the same cells, so a test can hand one clone to a
//! bridge, drop the bridge, and bootstrap again from another clone to
//! simulate a restart.

use super::{check_quota, BuildStorage};
use crate::{BridgeError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemoryStorage {
    cells: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    quota: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of a single stored value
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    /// Make every subsequent write fail (simulates unavailable storage)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing quota and failure switches
    pub fn seed(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Current raw value under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Every mutation is a single insert, so a poisoned map is still consistent
        self.cells.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BuildStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BridgeError::Storage("storage unavailable".to_string()));
        }
        check_quota(value, self.quota)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
