//! Bootstrap supplier
//!
//! Gathers the seed and the previously stored builds and packages them
//! as the flags handed to the application core at startup.

use crate::builds::{BuildSet, STORED_BUILDS_KEY};
use crate::storage::BuildStorage;
use crate::{BridgeError, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed for the core's pseudo-random behaviour (milliseconds since the epoch)
pub type Seed = i64;

/// Source of wall-clock time for the seed
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// The host's real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<F: Fn() -> SystemTime> Clock for F {
    fn now(&self) -> SystemTime {
        self()
    }
}

/// Initial state handed to the application core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub seed_int: Seed,
    pub stored_builds: BuildSet,
}

/// Derive the seed from the clock
///
/// A clock reading before the epoch, or too far past it to fit, means
/// the host clock cannot be trusted and startup must stop.
pub fn seed_from(clock: &dyn Clock) -> Result<Seed> {
    let elapsed = clock
        .now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BridgeError::ClockUnavailable(format!("clock is before the epoch: {}", e)))?;

    Seed::try_from(elapsed.as_millis())
        .map_err(|_| BridgeError::ClockUnavailable("clock reading out of range".to_string()))
}

/// Load the stored build set, falling back to empty
///
/// Nothing stored is the normal first-run case. A value that cannot be
/// read or parsed is logged and replaced by an empty set so a bad cache
/// never blocks startup.
pub fn load_builds(storage: &dyn BuildStorage) -> BuildSet {
    let text = match storage.read(STORED_BUILDS_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => {
            info!("No stored builds found, starting empty");
            return BuildSet::new();
        }
        Err(e) => {
            warn!("Failed to read stored builds, starting empty: {}", e);
            return BuildSet::new();
        }
    };

    match BuildSet::parse(&text) {
        Ok(builds) => {
            info!("Restored {} stored builds", builds.len());
            builds
        }
        Err(e) => {
            warn!("Discarding stored builds: {}", e);
            BuildSet::new()
        }
    }
}

/// Produce the bootstrap flags
pub fn supply(storage: &dyn BuildStorage, clock: &dyn Clock) -> Result<Flags> {
    let seed_int = seed_from(clock)?;
    debug!("Seed: {}", seed_int);

    Ok(Flags {
        seed_int,
        stored_builds: load_builds(storage),
    })
}
