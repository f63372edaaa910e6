//! Host speech backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// Used when the host has no usable speech capability
pub mod silent;
