use std::time::{Duration, Instant};

use saavy_round::{
    dsp::{pcm::read_frame, WaveShape},
    engine::{Voice, VoiceScheduler},
    io::{
        memory::{RecordingContext, RecordingSink},
        AudioContext, OutputSink,
    },
    sequencing::{Note, NoteSequencer},
    AudioFormat, BitDepth, Fill, SinkError, ToneGenerator, VoiceError,
};

fn render(
    format: AudioFormat,
    freq: f64,
    duration: Duration,
    shape: WaveShape,
    chunks: &[usize],
) -> Vec<u8> {
    let mut gen = ToneGenerator::new(format, freq, duration, shape).unwrap();
    let mut out = Vec::new();
    for &size in chunks.iter().cycle() {
        let mut buf = vec![0u8; size];
        let fill = gen.fill(&mut buf);
        out.extend_from_slice(&buf[..fill.written]);
        if fill.done {
            break;
        }
    }
    assert_eq!(out.len() as u64, gen.total_len());
    out
}

#[test]
fn output_is_invariant_under_chunking() {
    let formats = [
        AudioFormat::new(44_100, 1, 1).unwrap(),
        AudioFormat::new(44_100, 1, 2).unwrap(),
        AudioFormat::new(44_100, 2, 1).unwrap(),
        AudioFormat::new(44_100, 2, 2).unwrap(),
        AudioFormat::new(22_050, 4, 1).unwrap(),
    ];
    let partitions: [&[usize]; 6] = [&[1], &[3], &[7, 2], &[5, 64, 13], &[1000], &[4096, 1, 999]];

    for format in formats {
        for shape in WaveShape::ALL {
            let duration = Duration::from_millis(37);
            let whole = format.byte_len(duration) as usize;
            let reference = render(format, 523.3, duration, shape, &[whole.max(1)]);
            for chunks in partitions {
                let chunked = render(format, 523.3, duration, shape, chunks);
                assert_eq!(chunked, reference, "{format:?} {shape:?} {chunks:?}");
            }
        }
    }
}

#[test]
fn a440_in_3000_byte_chunks() {
    let format = AudioFormat::new(44_100, 1, 2).unwrap();
    let mut gen = ToneGenerator::new(format, 440.0, Duration::from_secs(1), WaveShape::Sine).unwrap();
    assert_eq!(gen.total_len(), 88_200);

    let mut chunked = Vec::new();
    let mut pulls = 0;
    let mut buf = [0u8; 3000];
    loop {
        let fill = gen.fill(&mut buf);
        pulls += 1;
        chunked.extend_from_slice(&buf[..fill.written]);
        if fill.done {
            // 29 full chunks, then the 1200-byte tail arrives with end-of-stream
            assert_eq!(fill.written, 1_200);
            break;
        }
        assert_eq!(fill.written, 3_000);
    }
    assert_eq!(pulls, 30);

    let mut single = vec![0u8; 88_200];
    let mut whole = ToneGenerator::new(format, 440.0, Duration::from_secs(1), WaveShape::Sine).unwrap();
    assert_eq!(whole.fill(&mut single), Fill { written: 88_200, done: true });
    assert_eq!(chunked, single);
}

#[test]
fn exhausted_generator_keeps_reporting_end() {
    let format = AudioFormat::default();
    let mut gen = ToneGenerator::new(format, 659.3, Duration::from_millis(10), WaveShape::Triangle).unwrap();
    let mut buf = vec![0u8; 1 << 16];
    let first = gen.fill(&mut buf);
    assert!(first.done);
    assert_eq!(first.written as u64, gen.total_len());

    for _ in 0..3 {
        buf.fill(0xAA);
        assert_eq!(gen.fill(&mut buf), Fill::END);
        assert!(buf.iter().all(|&b| b == 0xAA));
    }
}

#[test]
fn sine_cycle_sums_to_zero() {
    // 8000 / 100 = exactly 80 frames per cycle
    for bytes in [1, 2] {
        let format = AudioFormat::new(8_000, 1, bytes).unwrap();
        let depth = format.bit_depth();
        let pcm = render(format, 100.0, Duration::from_millis(10), WaveShape::Sine, &[4096]);
        assert_eq!(pcm.len(), 80 * depth.bytes());

        let sum: i32 = pcm
            .chunks_exact(depth.bytes())
            .map(|frame| read_frame(frame, depth))
            .sum();
        assert!(sum.abs() <= 80, "sum {sum} for {depth:?}");
    }
}

#[test]
fn pulse_halves_hold_their_levels() {
    for bytes in [1, 2] {
        let format = AudioFormat::new(8_000, 2, bytes).unwrap();
        let depth = format.bit_depth();
        let high = WaveShape::pulse_level(depth);
        let pcm = render(format, 100.0, Duration::from_millis(20), WaveShape::Pulse, &[333]);

        for (pos, frame) in pcm.chunks_exact(format.frame_size()).enumerate() {
            let expected = if pos % 80 < 40 { high } else { 0 };
            assert_eq!(read_frame(frame, depth), expected, "frame {pos} {depth:?}");
            // second channel mirrors the first
            assert_eq!(read_frame(&frame[depth.bytes()..], depth), expected);
        }
    }
    assert_eq!(WaveShape::pulse_level(BitDepth::Sixteen), 32767 / 10 * 3);
}

#[test]
fn muted_note_suspends_the_voice() {
    let context = RecordingContext::new(AudioFormat::new(8_000, 1, 1).unwrap());
    let notes = [
        Note::rest(Duration::from_millis(500)),
        Note::tone(440.0, Duration::from_millis(10)),
    ];

    let start = Instant::now();
    let report = NoteSequencer::new(&context, "sine", WaveShape::Sine)
        .play(&notes)
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(500));
    assert_eq!(report.rests, 1);
    assert_eq!(report.tones, 1);
    // only the tone produced bytes
    assert_eq!(context.notes_for("sine").len(), 1);
    assert_eq!(report.bytes, 80);
}

#[test]
fn round_voices_produce_independent_ordered_streams() {
    let format = AudioFormat::new(8_000, 2, 2).unwrap();
    let context = RecordingContext::new(format);
    let notes = [
        Note::tone(523.3, Duration::from_millis(30)),
        Note::rest(Duration::from_millis(10)),
        Note::tone(587.3, Duration::from_millis(20)),
        Note::tone(659.3, Duration::from_millis(25)),
    ];
    let voices = [
        Voice::new("sine", WaveShape::Sine),
        Voice::new("triangle", WaveShape::Triangle).start_after(Duration::from_millis(40)),
        Voice::new("pulse", WaveShape::Pulse).start_after(Duration::from_millis(80)),
    ];

    let outcomes = VoiceScheduler::new(&context)
        .voices(voices.iter().cloned())
        .chunk_size(1_001)
        .run(&notes);

    for (voice, outcome) in voices.iter().zip(&outcomes) {
        assert_eq!(outcome.voice, voice.name());
        let report = outcome.result.as_ref().unwrap();
        assert_eq!(report.tones, 3);
        assert_eq!(report.rests, 1);

        let expected: Vec<Vec<u8>> = notes
            .iter()
            .filter_map(|note| note.pitch.map(|pitch| (pitch, note.duration)))
            .map(|(pitch, duration)| render(format, pitch, duration, voice.shape(), &[4096]))
            .collect();
        assert_eq!(context.notes_for(voice.name()), expected, "{}", voice.name());
        assert_eq!(report.bytes, expected.iter().map(|n| n.len() as u64).sum::<u64>());
    }

    // the sine voice enters first, so its first note closes first
    assert_eq!(context.notes()[0].voice, "sine");
}

/// Fails every write for one voice, records nothing.
struct FlakyContext {
    format: AudioFormat,
    broken_voice: &'static str,
    inner: RecordingContext,
}

enum FlakySink {
    Working(RecordingSink),
    Broken,
}

impl OutputSink for FlakySink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        match self {
            FlakySink::Working(sink) => sink.write(bytes),
            FlakySink::Broken => Err(SinkError::Stream("underrun".into())),
        }
    }

    fn close(self) -> Result<(), SinkError> {
        match self {
            FlakySink::Working(sink) => sink.close(),
            FlakySink::Broken => Ok(()),
        }
    }
}

impl AudioContext for FlakyContext {
    type Sink = FlakySink;

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn open_sink(&self, voice: &str) -> Result<FlakySink, SinkError> {
        if voice == self.broken_voice {
            Ok(FlakySink::Broken)
        } else {
            self.inner.open_sink(voice).map(FlakySink::Working)
        }
    }
}

#[test]
fn failing_voice_does_not_stop_the_others() {
    let format = AudioFormat::new(8_000, 1, 2).unwrap();
    let context = FlakyContext {
        format,
        broken_voice: "triangle",
        inner: RecordingContext::new(format),
    };
    let notes = [
        Note::tone(440.0, Duration::from_millis(10)),
        Note::tone(880.0, Duration::from_millis(10)),
    ];

    let outcomes = VoiceScheduler::new(&context)
        .voice(Voice::new("sine", WaveShape::Sine))
        .voice(Voice::new("triangle", WaveShape::Triangle))
        .voice(Voice::new("pulse", WaveShape::Pulse).start_after(Duration::from_millis(20)))
        .run(&notes);

    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(VoiceError::Sink(SinkError::Stream(_)))
    ));
    assert!(outcomes[2].result.is_ok());

    assert_eq!(context.inner.notes_for("sine").len(), 2);
    assert_eq!(context.inner.notes_for("pulse").len(), 2);
    assert!(context.inner.notes_for("triangle").is_empty());
}
