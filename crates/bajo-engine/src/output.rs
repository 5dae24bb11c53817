//! cpal output boundary.
//!
//! The engine lives behind a mutex shared with the audio callback. A
//! missing output device is the only fatal error; a suspended stream is
//! resumed best-effort with failures swallowed and retried later.

use crate::engine::FretlessEngine;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Errors from the audio output boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No audio output device available on the system.
    #[error("no audio output device available")]
    NoDevice,

    /// Stream setup or runtime error.
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Convenience result type for output operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A running stereo output stream driving a [`FretlessEngine`].
///
/// The stream renders until the handle is dropped; once torn down it
/// cannot be restarted, only rebuilt.
pub struct AudioOutput {
    stream: cpal::Stream,
    engine: Arc<Mutex<FretlessEngine>>,
    sample_rate: f32,
}

impl AudioOutput {
    /// Open the default output device and start rendering.
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoDevice)?;
        let default_config = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let sample_rate = default_config.sample_rate() as f32;

        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let engine = Arc::new(Mutex::new(FretlessEngine::new(sample_rate)));
        let callback_engine = Arc::clone(&engine);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    match callback_engine.lock() {
                        Ok(mut engine) => engine.render(data),
                        Err(_) => data.fill(0.0),
                    }
                },
                |err| {
                    tracing::warn!(error = %err, "output stream error");
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(sample_rate, "audio output started");

        Ok(Self {
            stream,
            engine,
            sample_rate,
        })
    }

    /// Shared handle to the engine, for the input/render context.
    pub fn engine(&self) -> Arc<Mutex<FretlessEngine>> {
        Arc::clone(&self.engine)
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Opportunistic resume after a platform suspension. Failures are
    /// swallowed; the caller retries on the next interaction.
    pub fn resume(&self) {
        if let Err(err) = self.stream.play() {
            tracing::debug!(error = %err, "resume failed, will retry");
        }
    }

    /// One host frame: resume the stream if the platform suspended it,
    /// then run a reconciliation tick on the shared engine. The host
    /// calls this at display cadence.
    pub fn frame(&self, now_ms: f64) {
        self.resume();
        if let Ok(mut engine) = self.engine.lock() {
            engine.tick(now_ms);
        }
    }
}
