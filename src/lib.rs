//! rocket-bridge - host-side port bridge for the rocket builder
//!
//! Bootstraps the application core with a seed and the stored builds,
//! then relays its outbound ports to the host: phrase batches to the
//! speech synthesizer and build snapshots to durable storage.

pub mod bootstrap;
pub mod bridge;
pub mod builds;
pub mod config;
pub mod error;
pub mod platform;
pub mod ports;
pub mod sink;
pub mod speech;
pub mod stdio;
pub mod storage;

pub use bootstrap::{Flags, Seed};
pub use bridge::{ApplicationCore, Bridge, BridgeState};
pub use builds::BuildSet;
pub use error::{BridgeError, Result};
pub use ports::{CorePorts, PhraseBatch};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "rocket-bridge";
