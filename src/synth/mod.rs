// Purpose: per-note PCM synthesis
// This layer turns a pitch, a waveform and a duration into a byte stream

pub mod tone;

pub use tone::{Fill, ToneGenerator};
