//! Outbound ports from the application core
//!
//! Two independent channels, both unbounded and ordered: one carries
//! phrase batches to speak, the other carries full build snapshots to
//! persist. Order holds within a channel; nothing is promised across
//! the two.

use crate::builds::BuildSet;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Port name of the speech channel
pub const SPEECH_PORT: &str = "textToSpeechQueue";

/// Port name of the persist channel
pub const PERSIST_PORT: &str = "buildsToStore";

/// Phrases emitted together, spoken in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseBatch(pub Vec<String>);

impl PhraseBatch {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PhraseBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Sending half of the ports, held by the application core
///
/// Sends never block and never report host-side failures. Once the
/// bridge side is gone, messages are silently dropped.
#[derive(Clone)]
pub struct CorePorts {
    speech: UnboundedSender<PhraseBatch>,
    persist: UnboundedSender<BuildSet>,
}

impl CorePorts {
    /// Queue phrases for speech
    pub fn speak(&self, batch: PhraseBatch) {
        if self.speech.send(batch).is_err() {
            debug!("{} closed, batch dropped", SPEECH_PORT);
        }
    }

    /// Queue a full snapshot for persistence
    pub fn persist(&self, builds: BuildSet) {
        if self.persist.send(builds).is_err() {
            debug!("{} closed, snapshot dropped", PERSIST_PORT);
        }
    }
}

/// Receiving half of the ports, serviced by the bridge
pub struct BridgePorts {
    pub speech: UnboundedReceiver<PhraseBatch>,
    pub persist: UnboundedReceiver<BuildSet>,
}

/// Create a connected pair of port halves
pub fn channel() -> (CorePorts, BridgePorts) {
    let (speech_tx, speech_rx) = unbounded_channel();
    let (persist_tx, persist_rx) = unbounded_channel();

    (
        CorePorts {
            speech: speech_tx,
            persist: persist_tx,
        },
        BridgePorts {
            speech: speech_rx,
            persist: persist_rx,
        },
    )
}
