use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    error::SinkError,
    io::{
        format::AudioFormat,
        sink::{AudioContext, OutputSink},
    },
};

/// Bytes of one closed note, tagged with the voice that played it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNote {
    pub voice: String,
    pub bytes: Vec<u8>,
}

/// Offline output that keeps every note instead of playing it.
///
/// Notes are stored in the order their sinks were closed. Clones share the
/// same recording.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    format: AudioFormat,
    notes: Arc<Mutex<Vec<RecordedNote>>>,
}

impl RecordingContext {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedNote>> {
        // a panicking voice must not hide what the others recorded
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every recorded note, in close order.
    pub fn notes(&self) -> Vec<RecordedNote> {
        self.lock().clone()
    }

    /// The notes of one voice, in the order it played them.
    pub fn notes_for(&self, voice: &str) -> Vec<Vec<u8>> {
        self.lock()
            .iter()
            .filter(|note| note.voice == voice)
            .map(|note| note.bytes.clone())
            .collect()
    }

    /// The concatenated byte stream of one voice.
    pub fn stream_for(&self, voice: &str) -> Vec<u8> {
        self.notes_for(voice).concat()
    }
}

impl AudioContext for RecordingContext {
    type Sink = RecordingSink;

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn open_sink(&self, voice: &str) -> Result<RecordingSink, SinkError> {
        Ok(RecordingSink {
            voice: voice.to_owned(),
            bytes: Vec::new(),
            notes: Arc::clone(&self.notes),
        })
    }
}

pub struct RecordingSink {
    voice: String,
    bytes: Vec<u8>,
    notes: Arc<Mutex<Vec<RecordedNote>>>,
}

impl OutputSink for RecordingSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn close(self) -> Result<(), SinkError> {
        let note = RecordedNote {
            voice: self.voice,
            bytes: self.bytes,
        };
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(note);
        Ok(())
    }
}
