use std::{thread, time::Instant};

use crate::{
    error::SinkError,
    io::{
        format::AudioFormat,
        sink::{AudioContext, OutputSink},
    },
};

/// Headless output: bytes are dropped, but closing a sink takes as long as
/// playing them would have.
///
/// Keeps the timing of a round intact on machines without an audio device.
#[derive(Debug, Clone, Copy)]
pub struct NullContext {
    format: AudioFormat,
}

impl NullContext {
    pub fn new(format: AudioFormat) -> Self {
        Self { format }
    }
}

impl AudioContext for NullContext {
    type Sink = NullSink;

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn open_sink(&self, voice: &str) -> Result<NullSink, SinkError> {
        log::trace!("{voice}: opened null stream");
        Ok(NullSink {
            format: self.format,
            opened: Instant::now(),
            written: 0,
        })
    }
}

pub struct NullSink {
    format: AudioFormat,
    opened: Instant,
    written: u64,
}

impl NullSink {
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl OutputSink for NullSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn close(self) -> Result<(), SinkError> {
        let playback = self.format.duration_of(self.written);
        let elapsed = self.opened.elapsed();
        if playback > elapsed {
            thread::sleep(playback - elapsed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn close_waits_for_playback_time() {
        let format = AudioFormat::new(8_000, 1, 1).unwrap();
        let context = NullContext::new(format);

        let start = Instant::now();
        let mut sink = context.open_sink("test").unwrap();
        // 400 bytes at 8000 bytes/s = 50ms
        sink.write(&[128; 400]).unwrap();
        assert_eq!(sink.written(), 400);
        sink.close().unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
