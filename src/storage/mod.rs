//! Durable storage port
//!
//! The bridge reads one key at bootstrap and overwrites it on every
//! snapshot. Storage is injected through [`BuildStorage`] so the same
//! bridge runs against files on disk or an in-memory fake.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::Result;

/// Default quota, matching what browsers grant a single origin
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Key/value storage holding serialized snapshots
pub trait BuildStorage: Send {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key` in one step
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: BuildStorage + ?Sized> BuildStorage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

/// Fail with `QuotaExceeded` if `value` does not fit in `quota`
pub(crate) fn check_quota(value: &str, quota: Option<u64>) -> Result<()> {
    if let Some(quota) = quota {
        let needed = value.len() as u64;
        if needed > quota {
            return Err(crate::BridgeError::QuotaExceeded { needed, quota });
        }
    }
    Ok(())
}
