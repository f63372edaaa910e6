//! Line-delimited JSON adapter for an out-of-process core
//!
//! The bootstrap flags go out as one JSON line. Port traffic comes back
//! one message per line:
//!
//! ```text
//! {"port": "textToSpeechQueue", "data": ["Liftoff", "Stage separation"]}
//! {"port": "buildsToStore", "data": {"rocket-1": {"stages": 3}}}
//! ```
//!
//! Lines that cannot be understood are logged and skipped.

use crate::bootstrap::Flags;
use crate::bridge::ApplicationCore;
use crate::builds::BuildSet;
use crate::ports::{CorePorts, PhraseBatch, PERSIST_PORT, SPEECH_PORT};
use crate::{BridgeError, Result};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One message from the core
#[derive(Debug, Deserialize)]
struct Envelope {
    port: String,
    data: Value,
}

/// Counters for the input stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Lines routed to a port
    pub routed: u64,
    /// Lines skipped as malformed or addressed to an unknown port
    pub skipped: u64,
}

/// Application core living on the other end of a pipe
pub struct StdioCore<W: Write> {
    out: W,
    ports: Option<CorePorts>,
}

impl<W: Write> StdioCore<W> {
    pub fn new(out: W) -> Self {
        Self { out, ports: None }
    }

    /// Give back the output stream
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Route one input line to its port
    pub fn route_line(&self, line: &str) -> Result<()> {
        let ports = self
            .ports
            .as_ref()
            .ok_or_else(|| BridgeError::InvalidState("core not initialized".to_string()))?;

        let envelope: Envelope = serde_json::from_str(line)?;
        match envelope.port.as_str() {
            SPEECH_PORT => {
                let batch: PhraseBatch = serde_json::from_value(envelope.data)?;
                ports.speak(batch);
            }
            // Only stored snapshots read `null` as empty; a persist message
            // without an object would wipe every saved build
            PERSIST_PORT => match envelope.data {
                Value::Object(map) => ports.persist(BuildSet::from(map)),
                _ => {
                    return Err(BridgeError::Other(format!(
                        "{} expects an object of builds",
                        PERSIST_PORT
                    )));
                }
            },
            other => {
                return Err(BridgeError::Other(format!("unknown port {:?}", other)));
            }
        }
        Ok(())
    }

    /// Read lines until EOF, then drop the ports so the bridge can drain
    ///
    /// Only a read error ends the pump early; undecodable or malformed
    /// lines are skipped.
    pub async fn pump<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<PumpStats> {
        let result = self.pump_lines(reader).await;
        self.ports = None;

        if let Ok(stats) = &result {
            info!(
                "Core input closed: {} messages routed, {} skipped",
                stats.routed, stats.skipped
            );
        }
        result
    }

    async fn pump_lines<R: AsyncBufRead + Unpin>(&mut self, mut reader: R) -> Result<PumpStats> {
        let mut stats = PumpStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(stats);
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    stats.skipped += 1;
                    warn!("Skipping core message: not valid UTF-8: {}", e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match self.route_line(line) {
                Ok(()) => stats.routed += 1,
                Err(e) => {
                    stats.skipped += 1;
                    warn!("Skipping core message: {}", e);
                }
            }
        }
    }

    fn write_flags(&mut self, flags: &Flags) -> Result<()> {
        serde_json::to_writer(&mut self.out, flags)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> ApplicationCore for StdioCore<W> {
    fn init(&mut self, flags: Flags, ports: CorePorts) {
        debug!("Sending bootstrap flags to core");
        if let Err(e) = self.write_flags(&flags) {
            error!("Failed to send bootstrap flags: {}", e);
        }
        self.ports = Some(ports);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports;

    fn initialized() -> (StdioCore<Vec<u8>>, ports::BridgePorts) {
        let (core_ports, bridge_ports) = ports::channel();
        let mut core = StdioCore::new(Vec::new());
        core.init(
            Flags {
                seed_int: 7,
                stored_builds: BuildSet::new(),
            },
            core_ports,
        );
        (core, bridge_ports)
    }

    #[test]
    fn test_flags_line() {
        let (core, _ports) = initialized();
        let out = String::from_utf8(core.into_inner()).unwrap();
        assert_eq!(out, "{\"seedInt\":7,\"storedBuilds\":{}}\n");
    }

    #[test]
    fn test_route_lines() {
        let (core, mut ports) = initialized();

        core.route_line(r#"{"port":"textToSpeechQueue","data":["a","b"]}"#)
            .unwrap();
        core.route_line(r#"{"port":"buildsToStore","data":{"x":1}}"#)
            .unwrap();

        assert_eq!(ports.speech.try_recv().unwrap().len(), 2);
        assert!(ports.persist.try_recv().unwrap().contains("x"));
    }

    #[test]
    fn test_bad_lines_rejected() {
        let (core, _ports) = initialized();
        assert!(core.route_line("not json").is_err());
        assert!(core.route_line(r#"{"port":"launchCodes","data":[]}"#).is_err());
        assert!(core.route_line(r#"{"port":"textToSpeechQueue","data":{"a":1}}"#).is_err());
        assert!(core.route_line(r#"{"port":"buildsToStore","data":[1]}"#).is_err());
    }

    #[test]
    fn test_persist_without_object_is_rejected() {
        let (core, mut ports) = initialized();

        assert!(core.route_line(r#"{"port":"buildsToStore"}"#).is_err());
        assert!(core.route_line(r#"{"port":"buildsToStore","data":null}"#).is_err());
        assert!(core.route_line(r#"{"port":"buildsToStore","data":"{}"}"#).is_err());
        assert!(ports.persist.try_recv().is_err());
    }

    #[test]
    fn test_route_before_init() {
        let core = StdioCore::new(Vec::new());
        assert!(matches!(
            core.route_line(r#"{"port":"buildsToStore","data":{}}"#),
            Err(BridgeError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_pump_skips_garbage_and_closes_ports() {
        let (mut core, mut ports) = initialized();
        let input = "{\"port\":\"textToSpeechQueue\",\"data\":[\"Liftoff\"]}\n\ngarbage\n{\"port\":\"buildsToStore\",\"data\":{}}\n";

        let stats = core.pump(input.as_bytes()).await.unwrap();

        assert_eq!(stats, PumpStats { routed: 2, skipped: 1 });
        assert!(ports.speech.recv().await.is_some());
        assert!(ports.speech.recv().await.is_none());
        assert!(ports.persist.recv().await.is_some());
        assert!(ports.persist.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_skips_invalid_utf8() {
        let (mut core, mut ports) = initialized();
        let mut input = b"{\"port\":\"textToSpeechQueue\",\"data\":[\"\xff\xfe\"]}\n".to_vec();
        input.extend_from_slice(b"{\"port\":\"buildsToStore\",\"data\":{\"rocket-1\":{\"stages\":3}}}");

        let stats = core.pump(input.as_slice()).await.unwrap();

        assert_eq!(stats, PumpStats { routed: 1, skipped: 1 });
        assert!(ports.speech.recv().await.is_none());
        let builds = ports.persist.recv().await.unwrap();
        assert!(builds.contains("rocket-1"));
    }
}
