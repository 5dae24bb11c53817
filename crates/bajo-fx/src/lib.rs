//! Master-bus effects for the bajo instrument.
//!
//! The instrument's output chain is a fixed topology:
//!
//! ```text
//! voices → drive → tone → 3-band EQ → phaser → tremolo
//!        → dry + [chorus send | echo send | reverb send]
//!        → compressor → master gain → output
//! ```
//!
//! Every stage implements [`bajo_core::Effect`] and smooths its parameters
//! through [`bajo_core::SmoothedParam`] so settings changes never click.
//! [`MasterBus`] wires the chain and exposes the settings-facing setters.

pub mod bus;
pub mod chorus;
pub mod compressor;
pub mod drive;
pub mod echo;
pub mod eq;
pub mod phaser;
pub mod reverb;
pub mod tone;
pub mod tremolo;

pub use bus::MasterBus;
pub use chorus::Chorus;
pub use compressor::Compressor;
pub use drive::Drive;
pub use echo::Echo;
pub use eq::ShelfEq;
pub use phaser::Phaser;
pub use reverb::{ConvolutionReverb, stereo_impulse_response};
pub use tone::ToneFilter;
pub use tremolo::Tremolo;
