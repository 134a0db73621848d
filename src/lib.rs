pub mod dsp; // Waveform math and PCM quantization
pub mod engine; // Concurrent voice scheduling
pub mod error;
pub mod io; // Audio format, output sinks
pub mod sequencing; // Notes, melodies, per-voice playback
pub mod synth; // Tone generation

pub use error::{ConfigError, SinkError, VoiceError};
pub use io::format::{AudioFormat, BitDepth};
pub use synth::tone::{Fill, ToneGenerator};
