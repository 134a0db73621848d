//! Contract between the sequencer and whatever renders its PCM bytes.
//!
//! One [`OutputSink`] carries exactly one note. The [`AudioContext`] that
//! opens sinks is shared by every voice, so it must be able to hand out
//! several independent streams at the same time.

use crate::{error::SinkError, io::format::AudioFormat};

/// Byte-oriented PCM output for a single note.
pub trait OutputSink {
    /// Queue `bytes` for playback, blocking until all of them are accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Flush and release the stream.
    ///
    /// Returns once every written byte has been rendered.
    fn close(self) -> Result<(), SinkError>;
}

/// Shared output device that opens one stream per note.
pub trait AudioContext: Sync {
    type Sink: OutputSink;

    /// Layout of the bytes every sink expects.
    fn format(&self) -> AudioFormat;

    /// Open a fresh stream for the next note of `voice`.
    fn open_sink(&self, voice: &str) -> Result<Self::Sink, SinkError>;
}
