//! Build store sink
//!
//! Drains the persist port and writes each snapshot over the previous
//! one. Snapshots are written one at a time in arrival order, so the
//! stored value is always the latest snapshot received. A failed write
//! is logged and forgotten; the running session never sees it.

use crate::builds::{BuildSet, STORED_BUILDS_KEY};
use crate::storage::BuildStorage;
use crate::Result;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

/// Counters kept by the sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Snapshots written successfully
    pub written: u64,
    /// Snapshots that could not be written
    pub failed: u64,
}

pub struct BuildStoreSink<B: BuildStorage> {
    storage: Arc<Mutex<B>>,
    stats: SinkStats,
}

impl<B: BuildStorage + 'static> BuildStoreSink<B> {
    pub fn new(storage: B) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            stats: SinkStats::default(),
        }
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Persist one snapshot, swallowing any failure
    ///
    /// Serialization and the write run on the blocking pool; the next
    /// snapshot is not started until this one has finished.
    pub async fn store(&mut self, builds: BuildSet) {
        let storage = Arc::clone(&self.storage);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut storage = storage.lock().unwrap_or_else(|e| e.into_inner());
            write_snapshot(&mut *storage, &builds)
        })
        .await;

        match outcome {
            Ok(Ok(())) => self.stats.written += 1,
            Ok(Err(e)) => {
                self.stats.failed += 1;
                warn!("Failed to persist builds, keeping session alive: {}", e);
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("Build write task failed, keeping session alive: {}", e);
            }
        }
    }

    /// Service the persist port until every sender is gone
    pub async fn run(mut self, mut rx: UnboundedReceiver<BuildSet>) -> Self {
        info!("Build store sink running");

        while let Some(builds) = rx.recv().await {
            self.store(builds).await;
        }

        info!(
            "Persist port closed: {} snapshots written, {} failed",
            self.stats.written, self.stats.failed
        );
        self
    }
}

/// Serialize and store one snapshot, replacing whatever was stored
fn write_snapshot<B: BuildStorage + ?Sized>(storage: &mut B, builds: &BuildSet) -> Result<()> {
    let text = builds.to_canonical()?;
    storage.write(STORED_BUILDS_KEY, &text)?;
    debug!("Stored {} builds ({} bytes)", builds.len(), text.len());
    Ok(())
}
