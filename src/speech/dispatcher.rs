//! Speech dispatcher
//!
//! Drains the speech port and submits each phrase to the synthesizer.
//! A batch is submitted in full before the next one is looked at, so
//! phrases from different batches never interleave. Submission is
//! fire-and-forget: failures are logged and the next phrase proceeds.

use crate::ports::PhraseBatch;
use crate::speech::Synth;
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;

/// Counters kept by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Batches received from the core
    pub batches: u64,
    /// Utterances accepted by the synthesizer
    pub submitted: u64,
    /// Utterances the synthesizer rejected
    pub dropped: u64,
}

pub struct SpeechDispatcher<S: Synth> {
    synth: S,
    stats: DispatchStats,
}

impl<S: Synth> SpeechDispatcher<S> {
    pub fn new(synth: S) -> Self {
        Self {
            synth,
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Give back the synthesizer
    pub fn into_synth(self) -> S {
        self.synth
    }

    /// Submit one batch, phrase by phrase, in order
    pub fn dispatch(&mut self, batch: &PhraseBatch) {
        self.stats.batches += 1;
        debug!("Dispatching batch of {} phrases", batch.len());

        for phrase in batch.iter() {
            if phrase.is_empty() {
                continue;
            }
            match self.synth.speak(phrase) {
                Ok(()) => self.stats.submitted += 1,
                Err(e) => {
                    self.stats.dropped += 1;
                    warn!("Dropped utterance {:?}: {}", phrase, e);
                }
            }
        }
    }

    /// Service the speech port until every sender is gone
    pub async fn run(mut self, mut rx: UnboundedReceiver<PhraseBatch>) -> Self {
        info!("Speech dispatcher running ({} backend)", self.synth.name());

        while let Some(batch) = rx.recv().await {
            self.dispatch(&batch);
        }

        info!(
            "Speech port closed: {} batches, {} utterances, {} dropped",
            self.stats.batches, self.stats.submitted, self.stats.dropped
        );
        self
    }
}
