//! Error types shared by the generator, the sinks and the voice scheduler.
//!
//! End-of-stream is not an error: a finished tone reports it through
//! [`Fill::done`](crate::synth::tone::Fill).

use thiserror::Error;

/// Invalid format or note parameters, detected before any synthesis starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("channel count must be greater than zero")]
    InvalidChannelCount,
    #[error("unsupported bit depth: {0} bytes (expected 1 or 2)")]
    UnsupportedBitDepth(u8),
    #[error("tone frequency must be a positive number of Hz, got {0}")]
    InvalidFrequency(f64),
}

/// Failures of the output sink that renders PCM bytes to a device.
///
/// A sink error ends the voice that owns the sink. It is not retried.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no default output device available")]
    NoOutputDevice,
    #[error("output device `{0}` not found")]
    DeviceNotFound(String),
    #[error("failed to enumerate output devices")]
    Devices(#[from] cpal::DevicesError),
    #[error("failed to query supported output configurations")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error("output device cannot play {channels} channels at {sample_rate} Hz")]
    UnsupportedConfig { channels: u16, sample_rate: u32 },
    #[error("unsupported device sample format: {0}")]
    UnsupportedSampleFormat(String),
    #[error("failed to build output stream")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("output stream failed: {0}")]
    Stream(String),
}

/// Why a single voice stopped before the end of its note list.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("failed to spawn voice thread")]
    Spawn(#[from] std::io::Error),
    #[error("voice thread panicked")]
    Panicked,
}
