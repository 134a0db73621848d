use std::time::Duration;

use crate::{
    dsp::{pcm, waveform::WaveShape},
    error::ConfigError,
    io::format::{AudioFormat, ALIGNMENT},
};

/*
Tone Generator
==============

Pull-based PCM producer for a single note. The caller hands in a byte buffer,
the generator fills as much of it as it can and reports whether the note is
over.

  total_len = frame_size · sample_rate · duration, floored to 4 bytes
  cursor    = bytes synthesized so far (always a multiple of 4)
  frame pos = cursor / frame_size

Buffers that are not a multiple of 4 bytes are synthesized into a scratch
buffer rounded up to the next multiple of 4. The caller receives the prefix
it asked for; the tail waits in the overflow buffer and is handed out, on its
own, by the next call before any new synthesis happens. This keeps the byte
stream identical no matter how the caller chunks its reads.

    fill(7)  ->  synth 8 bytes, deliver 7, keep 1
    fill(7)  ->  deliver the 1 kept byte
    fill(7)  ->  synth 8 bytes, deliver 7, keep 1 ...
*/

/// Outcome of one [`ToneGenerator::fill`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Bytes written at the start of the destination buffer.
    pub written: usize,
    /// The note is exhausted; these are its last bytes (possibly none).
    pub done: bool,
}

impl Fill {
    pub const END: Fill = Fill {
        written: 0,
        done: true,
    };
}

/// Stateful PCM synthesis for one note of one waveform.
#[derive(Debug)]
pub struct ToneGenerator {
    format: AudioFormat,
    shape: WaveShape,
    /// Frames per waveform period.
    cycle: f64,
    total_len: u64,
    cursor: u64,
    overflow: Vec<u8>,
    overflow_read: usize,
}

impl ToneGenerator {
    pub fn new(
        format: AudioFormat,
        frequency: f64,
        duration: Duration,
        shape: WaveShape,
    ) -> Result<Self, ConfigError> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ConfigError::InvalidFrequency(frequency));
        }

        Ok(Self {
            format,
            shape,
            cycle: format.sample_rate() as f64 / frequency,
            total_len: format.byte_len(duration),
            cursor: 0,
            overflow: Vec::with_capacity(ALIGNMENT),
            overflow_read: 0,
        })
    }

    /// Fill `dest` with the next bytes of the note.
    ///
    /// After the last byte has been delivered every further call returns
    /// [`Fill::END`].
    pub fn fill(&mut self, dest: &mut [u8]) -> Fill {
        if self.overflow_read < self.overflow.len() {
            let pending = &self.overflow[self.overflow_read..];
            let n = pending.len().min(dest.len());
            dest[..n].copy_from_slice(&pending[..n]);
            self.overflow_read += n;
            return Fill {
                written: n,
                done: self.is_finished(),
            };
        }

        if self.cursor == self.total_len {
            return Fill::END;
        }

        let remaining = self.total_len - self.cursor;
        let (len, last) = match usize::try_from(remaining) {
            Ok(remaining) if remaining <= dest.len() => (remaining, true),
            _ => (dest.len(), false),
        };

        let misaligned = len % ALIGNMENT;
        if misaligned == 0 {
            self.synthesize(&mut dest[..len]);
            return Fill {
                written: len,
                done: last,
            };
        }

        // `remaining` is a multiple of ALIGNMENT, so only a short request lands here
        let mut scratch = vec![0u8; len + ALIGNMENT - misaligned];
        self.synthesize(&mut scratch);
        dest[..len].copy_from_slice(&scratch[..len]);
        self.overflow = scratch.split_off(len);
        self.overflow_read = 0;

        Fill {
            written: len,
            done: last && self.is_finished(),
        }
    }

    /// Render whole frames into `out` and advance the cursor by its length.
    ///
    /// Trailing bytes that cannot hold a whole frame are zeroed.
    fn synthesize(&mut self, out: &mut [u8]) {
        let frame_size = self.format.frame_size();
        let depth = self.format.bit_depth();
        let mut pos = self.cursor / frame_size as u64;

        let mut frames = out.chunks_exact_mut(frame_size);
        for frame in &mut frames {
            let value = self.shape.amplitude(pos, self.cycle, depth);
            pcm::write_frame(frame, value, &self.format);
            pos += 1;
        }
        frames.into_remainder().fill(0);

        self.cursor += out.len() as u64;
    }

    /// Every byte of the note has been handed to the caller.
    pub fn is_finished(&self) -> bool {
        self.cursor == self.total_len && self.overflow_read == self.overflow.len()
    }

    /// Byte length of the whole note.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Bytes synthesized so far, including any not yet delivered.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

impl std::io::Read for ToneGenerator {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(self.fill(buf).written)
    }
}
