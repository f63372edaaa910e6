//! Bridge lifecycle
//!
//! `Uninitialized → Bootstrapped → Running`, each step taken once.
//! Bootstrap builds the flags; start hands them to the application core
//! together with its ports, then services the ports for the rest of the
//! process. There is no shutdown step: the services end when the core
//! drops its ports.

use crate::bootstrap::{self, Clock, Flags};
use crate::ports::{self, CorePorts};
use crate::sink::BuildStoreSink;
use crate::speech::{SpeechDispatcher, Synth};
use crate::storage::BuildStorage;
use crate::{BridgeError, Result};
use log::info;
use std::fmt;
use tokio::task::JoinHandle;

/// The external application core
///
/// `init` is called exactly once, synchronously, with the bootstrap
/// flags and the ports the core uses to reach the host.
pub trait ApplicationCore {
    fn init(&mut self, flags: Flags, ports: CorePorts);
}

impl<F: FnMut(Flags, CorePorts)> ApplicationCore for F {
    fn init(&mut self, flags: Flags, ports: CorePorts) {
        self(flags, ports)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Bootstrapped,
    Running,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BridgeState::Uninitialized => "uninitialized",
            BridgeState::Bootstrapped => "bootstrapped",
            BridgeState::Running => "running",
        };
        f.write_str(name)
    }
}

/// Host side of the application: storage, speech and their wiring
pub struct Bridge<B: BuildStorage, S: Synth> {
    state: BridgeState,
    storage: Option<B>,
    synth: Option<S>,
    flags: Option<Flags>,
}

impl<B, S> Bridge<B, S>
where
    B: BuildStorage + 'static,
    S: Synth + 'static,
{
    pub fn new(storage: B, synth: S) -> Self {
        Self {
            state: BridgeState::Uninitialized,
            storage: Some(storage),
            synth: Some(synth),
            flags: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Read the clock and the stored builds; only allowed once
    pub fn bootstrap(&mut self, clock: &dyn Clock) -> Result<&Flags> {
        self.expect_state(BridgeState::Uninitialized, "bootstrap")?;
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| BridgeError::InvalidState("storage already taken".to_string()))?;

        let flags = bootstrap::supply(storage, clock)?;
        self.state = BridgeState::Bootstrapped;
        info!(
            "Bridge bootstrapped with {} stored builds",
            flags.stored_builds.len()
        );

        Ok(&*self.flags.insert(flags))
    }

    /// Initialize the core and start servicing its ports
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, core: &mut dyn ApplicationCore) -> Result<RunningBridge<B, S>> {
        self.expect_state(BridgeState::Bootstrapped, "start")?;

        let (flags, storage, synth) =
            match (self.flags.take(), self.storage.take(), self.synth.take()) {
                (Some(flags), Some(storage), Some(synth)) => (flags, storage, synth),
                _ => return Err(BridgeError::InvalidState("bridge parts missing".to_string())),
            };

        let (core_ports, bridge_ports) = ports::channel();
        core.init(flags, core_ports);

        let speech = tokio::spawn(SpeechDispatcher::new(synth).run(bridge_ports.speech));
        let persist = tokio::spawn(BuildStoreSink::new(storage).run(bridge_ports.persist));

        self.state = BridgeState::Running;
        info!("Bridge running");

        Ok(RunningBridge { speech, persist })
    }

    /// Bootstrap and start in one step
    pub fn launch(
        &mut self,
        clock: &dyn Clock,
        core: &mut dyn ApplicationCore,
    ) -> Result<RunningBridge<B, S>> {
        self.bootstrap(clock)?;
        self.start(core)
    }

    fn expect_state(&self, expected: BridgeState, action: &str) -> Result<()> {
        if self.state != expected {
            return Err(BridgeError::InvalidState(format!(
                "cannot {} while {}",
                action, self.state
            )));
        }
        Ok(())
    }
}

/// Port services spawned by [`Bridge::start`]
pub struct RunningBridge<B: BuildStorage, S: Synth> {
    speech: JoinHandle<SpeechDispatcher<S>>,
    persist: JoinHandle<BuildStoreSink<B>>,
}

impl<B, S> RunningBridge<B, S>
where
    B: BuildStorage + 'static,
    S: Synth + 'static,
{
    /// Wait for both services to drain after the core dropped its ports
    pub async fn join(self) -> Result<(SpeechDispatcher<S>, BuildStoreSink<B>)> {
        let dispatcher = self
            .speech
            .await
            .map_err(|e| BridgeError::Other(format!("speech dispatcher task failed: {}", e)))?;
        let sink = self
            .persist
            .await
            .map_err(|e| BridgeError::Other(format!("build store task failed: {}", e)))?;
        Ok((dispatcher, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::silent::SilentSynth;
    use crate::storage::MemoryStorage;
    use std::time::SystemTime;

    #[test]
    fn test_bootstrap_only_once() {
        let mut bridge = Bridge::new(MemoryStorage::new(), SilentSynth::new());
        assert_eq!(bridge.state(), BridgeState::Uninitialized);

        bridge.bootstrap(&SystemTime::now).unwrap();
        assert_eq!(bridge.state(), BridgeState::Bootstrapped);

        let err = bridge.bootstrap(&SystemTime::now).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidState(_)));
    }

    #[test]
    fn test_start_requires_bootstrap() {
        let mut bridge = Bridge::new(MemoryStorage::new(), SilentSynth::new());
        let mut initialized = false;
        let mut core = |_: Flags, _: CorePorts| initialized = true;
        assert!(matches!(
            bridge.start(&mut core),
            Err(BridgeError::InvalidState(_))
        ));
        drop(core);
        assert!(!initialized);
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
    }
}
