//! Silent backend for hosts without speech
//!
//! Accepts every request and produces no sound, so an absent speech
//! capability turns each utterance into a no-op instead of an error.

use crate::speech::Synth;
use crate::Result;
use log::trace;

#[derive(Debug, Default)]
pub struct SilentSynth;

impl SilentSynth {
    pub fn new() -> Self {
        Self
    }
}

impl Synth for SilentSynth {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn set_rate(&mut self, _rate: u8) -> Result<()> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: u8) -> Result<()> {
        Ok(())
    }

    fn set_voice_idx(&mut self, _idx: usize) -> Result<()> {
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        trace!("Speech unavailable, dropping: {}", text);
        Ok(())
    }
}
