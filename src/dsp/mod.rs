//! Low-level sample math used by the tone generator.
//!
//! Everything here is a pure function of its inputs: waveform amplitudes are
//! computed from the frame position alone and quantization writes straight
//! into the caller's byte slice.

/// PCM frame encoding for 8- and 16-bit output.
pub mod pcm;
/// Sine, triangle and pulse amplitude functions.
pub mod waveform;

pub use waveform::WaveShape;
