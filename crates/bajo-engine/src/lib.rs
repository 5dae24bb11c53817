//! Orchestration layer for the bajo fretless bass.
//!
//! [`FretlessEngine`] owns the touch tracker, note registry, and master
//! bus, and wires them together: event-driven input feeds the tracker,
//! a frame-rate [`tick`](FretlessEngine::tick) reconciles touches into
//! voice commands, and the audio callback pulls rendered frames through
//! [`render`](FretlessEngine::render). [`AudioOutput`] is the cpal
//! boundary; a missing output device is the only fatal error.

pub mod engine;
pub mod output;
pub mod resolver;
pub mod settings;

pub use engine::FretlessEngine;
pub use output::{AudioOutput, Error, Result};
pub use resolver::{Command, resolve};
pub use settings::{Settings, Theme, Waveform};
