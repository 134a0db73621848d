//! Sequencer - plays a note list through one voice
//!
//! Notes are strictly sequential: each tone is streamed through its own sink
//! and the sink is closed (fully rendered) before the next note starts. Rests
//! just put the voice thread to sleep.

use std::thread;

use crate::{
    dsp::waveform::WaveShape,
    error::VoiceError,
    io::sink::{AudioContext, OutputSink},
    sequencing::note::Note,
    synth::tone::ToneGenerator,
};

/// Bytes pulled from the generator per sink write.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// What a voice got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceReport {
    pub tones: usize,
    pub rests: usize,
    pub bytes: u64,
}

/// Drives one [`ToneGenerator`] per note for a single voice.
pub struct NoteSequencer<'a, C: AudioContext> {
    context: &'a C,
    voice: String,
    shape: WaveShape,
    chunk_size: usize,
}

impl<'a, C: AudioContext> NoteSequencer<'a, C> {
    pub fn new(context: &'a C, voice: impl Into<String>, shape: WaveShape) -> Self {
        Self {
            context,
            voice: voice.into(),
            shape,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Size of the buffer handed to the generator on each pull (min 1 byte).
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Play every note in order, stopping at the first failure.
    pub fn play(&self, notes: &[Note]) -> Result<VoiceReport, VoiceError> {
        let mut report = VoiceReport::default();
        let mut buffer = vec![0u8; self.chunk_size];

        for (index, note) in notes.iter().enumerate() {
            match note.pitch {
                None => {
                    log::debug!("{}: note {index} rest {:?}", self.voice, note.duration);
                    thread::sleep(note.duration);
                    report.rests += 1;
                }
                Some(frequency) => {
                    log::debug!(
                        "{}: note {index} {frequency} Hz for {:?}",
                        self.voice,
                        note.duration
                    );
                    report.bytes += self.play_tone(frequency, note, &mut buffer)?;
                    report.tones += 1;
                }
            }
        }

        Ok(report)
    }

    fn play_tone(&self, frequency: f64, note: &Note, buffer: &mut [u8]) -> Result<u64, VoiceError> {
        let mut generator =
            ToneGenerator::new(self.context.format(), frequency, note.duration, self.shape)?;
        let mut sink = self.context.open_sink(&self.voice)?;

        let mut written = 0u64;
        loop {
            let fill = generator.fill(buffer);
            if fill.written > 0 {
                sink.write(&buffer[..fill.written])?;
                written += fill.written as u64;
                log::trace!("{}: wrote {} bytes", self.voice, fill.written);
            }
            if fill.done {
                break;
            }
        }

        sink.close()?;
        Ok(written)
    }
}
