#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Internal buffers are aligned to this many bytes regardless of frame size.
pub const ALIGNMENT: usize = 4;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 2;
pub const DEFAULT_BIT_DEPTH_BYTES: u8 = 2;

/// Width of one PCM sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Unsigned 8-bit, biased by 128.
    Eight,
    /// Signed 16-bit little-endian.
    Sixteen,
}

impl BitDepth {
    pub const fn bytes(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }

    /// Largest positive sample value.
    pub const fn max_amplitude(self) -> i32 {
        match self {
            BitDepth::Eight => i8::MAX as i32,
            BitDepth::Sixteen => i16::MAX as i32,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = ConfigError;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(BitDepth::Eight),
            2 => Ok(BitDepth::Sixteen),
            other => Err(ConfigError::UnsupportedBitDepth(other)),
        }
    }
}

/// PCM layout shared by every generator and sink of a run.
///
/// Built once at startup and passed by value; nothing reads it from global
/// state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u16,
    bit_depth: BitDepth,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16, bit_depth_bytes: u8) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        if channels == 0 {
            return Err(ConfigError::InvalidChannelCount);
        }
        let bit_depth = BitDepth::try_from(bit_depth_bytes)?;

        Ok(Self {
            sample_rate,
            channels,
            bit_depth,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Bytes per frame: one sample for every channel.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.bit_depth.bytes()
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u64 {
        self.frame_size() as u64 * self.sample_rate as u64
    }

    /// Byte length of a tone lasting `duration`, floored to [`ALIGNMENT`].
    ///
    /// The flooring ignores the real frame size, so formats whose frame size
    /// does not divide 4 lose the last partial frame.
    pub fn byte_len(&self, duration: std::time::Duration) -> u64 {
        let bytes = self.byte_rate() as u128 * duration.as_nanos() / 1_000_000_000;
        let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);
        bytes / ALIGNMENT as u64 * ALIGNMENT as u64
    }

    /// Wall-clock time needed to render `bytes` of audio.
    pub fn duration_of(&self, bytes: u64) -> std::time::Duration {
        let nanos = bytes as u128 * 1_000_000_000 / self.byte_rate() as u128;
        std::time::Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bit_depth: BitDepth::Sixteen,
        }
    }
}
