//! Speech synthesizer abstraction
//!
//! Provides a unified interface to the host's text-to-speech. The
//! dispatcher submits utterances through it; the backend owns playback
//! and plays queued utterances in submission order.

use super::backends::native::NativeSynth;
use super::backends::silent::SilentSynth;
use crate::config::Config;
use crate::platform::speech_install_hint;
use crate::Result;
use log::{info, warn};

/// Speech synthesizer trait
///
/// All backends implement this to provide text-to-speech.
pub trait Synth: Send {
    /// Short backend name for logging
    fn name(&self) -> &'static str;

    /// Set speech rate (0-100, where 50 is normal)
    fn set_rate(&mut self, rate: u8) -> Result<()>;

    /// Set speech volume (0-100)
    fn set_volume(&mut self, volume: u8) -> Result<()>;

    /// Set voice by index (platform-specific)
    fn set_voice_idx(&mut self, idx: usize) -> Result<()>;

    /// Queue text behind anything already queued
    fn speak(&mut self, text: &str) -> Result<()>;
}

impl<S: Synth + ?Sized> Synth for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn set_rate(&mut self, rate: u8) -> Result<()> {
        (**self).set_rate(rate)
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        (**self).set_volume(volume)
    }

    fn set_voice_idx(&mut self, idx: usize) -> Result<()> {
        (**self).set_voice_idx(idx)
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        (**self).speak(text)
    }
}

/// Create the host speech synthesizer
///
/// Uses the native backend (Speech Dispatcher on Linux, AVFoundation on
/// macOS, WinRT/SAPI on Windows). When speech is disabled in config or
/// the native backend cannot start, falls back to a silent backend:
/// speech is feedback only, so its absence never stops the bridge.
pub fn create_synth(config: &Config) -> Box<dyn Synth> {
    if !config.speech_enabled() {
        info!("Speech disabled in config, using silent backend");
        return Box::new(SilentSynth::new());
    }

    let mut synth: Box<dyn Synth> = match NativeSynth::new() {
        Ok(synth) => {
            info!("✓ Successfully initialized native TTS backend");
            Box::new(synth)
        }
        Err(e) => {
            warn!("✗ Native TTS backend unavailable: {}", e);
            if let Some(hint) = speech_install_hint() {
                warn!("{}", hint);
            }
            warn!("Continuing without speech");
            return Box::new(SilentSynth::new());
        }
    };

    apply_settings(synth.as_mut(), config);
    synth
}

/// Apply rate, volume and voice from config, logging what cannot be applied
pub fn apply_settings(synth: &mut dyn Synth, config: &Config) {
    if let Some(rate) = config.rate() {
        match synth.set_rate(rate) {
            Ok(()) => info!("Speech rate set to {}", rate),
            Err(e) => warn!("Could not set speech rate: {}", e),
        }
    }
    if let Some(volume) = config.volume() {
        match synth.set_volume(volume) {
            Ok(()) => info!("Speech volume set to {}", volume),
            Err(e) => warn!("Could not set speech volume: {}", e),
        }
    }
    if let Some(voice_idx) = config.voice_idx() {
        match synth.set_voice_idx(voice_idx) {
            Ok(()) => info!("Speech voice index set to {}", voice_idx),
            Err(e) => warn!("Could not set speech voice: {}", e),
        }
    }
}
