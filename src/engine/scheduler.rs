//! Scheduler - runs every voice of a round concurrently
//!
//! One scoped thread per voice. A voice waits for its start delay, then plays
//! the shared note list with its own sequencer. Voices share nothing but the
//! audio context, so a failing voice never stops its siblings.

use std::{thread, time::Duration};

use crate::{
    dsp::waveform::WaveShape,
    error::VoiceError,
    io::sink::AudioContext,
    sequencing::{
        note::Note,
        sequencer::{NoteSequencer, VoiceReport, DEFAULT_CHUNK_SIZE},
    },
};

/// One instrument part: a waveform entering after a fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    name: String,
    shape: WaveShape,
    start_delay: Duration,
}

impl Voice {
    pub fn new(name: impl Into<String>, shape: WaveShape) -> Self {
        Self {
            name: name.into(),
            shape,
            start_delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before the first note.
    pub fn start_after(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> WaveShape {
        self.shape
    }

    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }
}

/// How one voice finished.
#[derive(Debug)]
pub struct VoiceOutcome {
    pub voice: String,
    pub result: Result<VoiceReport, VoiceError>,
}

/// Builder that plays the same note list on several voices at once.
pub struct VoiceScheduler<'a, C: AudioContext> {
    context: &'a C,
    voices: Vec<Voice>,
    chunk_size: usize,
}

impl<'a, C: AudioContext> VoiceScheduler<'a, C> {
    pub fn new(context: &'a C) -> Self {
        Self {
            context,
            voices: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Add a voice
    pub fn voice(mut self, voice: Voice) -> Self {
        self.voices.push(voice);
        self
    }

    pub fn voices(mut self, voices: impl IntoIterator<Item = Voice>) -> Self {
        self.voices.extend(voices);
        self
    }

    /// Generator pull size used by every voice's sequencer.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Play `notes` on every voice and wait for all of them to finish.
    ///
    /// Outcomes come back in the order the voices were added.
    pub fn run(&self, notes: &[Note]) -> Vec<VoiceOutcome> {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .voices
                .iter()
                .map(|voice| {
                    let handle = thread::Builder::new()
                        .name(format!("voice-{}", voice.name))
                        .spawn_scoped(scope, move || self.run_voice(voice, notes));
                    (voice, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(voice, handle)| {
                    let result = match handle {
                        Ok(handle) => handle.join().unwrap_or(Err(VoiceError::Panicked)),
                        Err(err) => {
                            log::error!("{}: failed to spawn voice thread: {err}", voice.name);
                            Err(VoiceError::Spawn(err))
                        }
                    };
                    VoiceOutcome {
                        voice: voice.name.clone(),
                        result,
                    }
                })
                .collect()
        })
    }

    fn run_voice(&self, voice: &Voice, notes: &[Note]) -> Result<VoiceReport, VoiceError> {
        if !voice.start_delay.is_zero() {
            log::debug!("{}: entering in {:?}", voice.name, voice.start_delay);
            thread::sleep(voice.start_delay);
        }
        log::info!("{}: playing {} notes ({:?})", voice.name, notes.len(), voice.shape);

        let result = NoteSequencer::new(self.context, voice.name.as_str(), voice.shape)
            .chunk_size(self.chunk_size)
            .play(notes);

        match &result {
            Ok(report) => log::info!(
                "{}: finished ({} tones, {} rests, {} bytes)",
                voice.name,
                report.tones,
                report.rests,
                report.bytes
            ),
            Err(err) => log::error!("{}: stopped: {err}", voice.name),
        }
        result
    }
}
