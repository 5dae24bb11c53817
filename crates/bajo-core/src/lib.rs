//! Bajo Core - DSP primitives for the bajo instrument engine
//!
//! Foundational building blocks for real-time audio, designed for zero
//! allocation in the audio path.
//!
//! # Core Abstractions
//!
//! - [`Effect`] - Object-safe trait for audio processors, mono and stereo
//! - [`SmoothedParam`] - Exponential parameter smoothing for click-free
//!   automation
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`InterpolatedDelay`] - Variable-length delay line with interpolation
//! - [`Lfo`] - Low-frequency oscillator for modulation
//! - [`EnvelopeFollower`] - Amplitude envelope detection for dynamics
//! - [`NoiseGen`] - Deterministic xorshift white noise
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! bajo-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations in processing paths
//! - **`libm` for math**: no dependency on std float intrinsics
//! - **Object-safe traits**: dynamic dispatch when needed

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod biquad;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod noise;
pub mod param;

pub use biquad::{
    Biquad, bandpass_coefficients, high_shelf_coefficients, low_shelf_coefficients,
    lowpass_coefficients, peaking_eq_coefficients,
};
pub use delay::InterpolatedDelay;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    constant_power_pan, db_to_linear, flush_denormal, linear_to_db, semitone_ratio, wet_dry_mix,
};
pub use noise::NoiseGen;
pub use param::SmoothedParam;
