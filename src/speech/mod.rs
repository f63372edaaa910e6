//! Speech synthesis system

pub mod backends;
pub mod dispatcher;
pub mod synth;

pub use dispatcher::{DispatchStats, SpeechDispatcher};
pub use synth::{create_synth, Synth};
