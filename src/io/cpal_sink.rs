//! Device output through cpal.
//!
//! Every note gets its own cpal output stream. The sequencer thread pushes
//! PCM bytes into an rtrb ring, the audio callback pops them and converts
//! them into whatever sample type the device accepts for the requested
//! channels and rate, preferring `f32`. Running out of bytes plays silence.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread,
    time::{Duration, Instant},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SampleFormat, SizedSample,
};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::SinkError,
    io::{
        format::{AudioFormat, BitDepth},
        sink::{AudioContext, OutputSink},
    },
};

// Tunables
const RING_LATENCY: Duration = Duration::from_millis(100);
const MIN_RING_BYTES: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(2);
/// Time left for the device to play out its own buffer after the ring drains.
const DRAIN_TAIL: Duration = Duration::from_millis(50);
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Opens one cpal output stream per note on the default (or a named) device.
#[derive(Debug, Clone)]
pub struct CpalContext {
    format: AudioFormat,
    device_name: Option<String>,
}

impl CpalContext {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            device_name: None,
        }
    }

    /// Play through the output device called `name` instead of the default.
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    fn device(&self) -> Result<cpal::Device, SinkError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host.default_output_device().ok_or(SinkError::NoOutputDevice),
            Some(name) => host
                .output_devices()?
                .find(|device| device.name().is_ok_and(|n| n == *name))
                .ok_or_else(|| SinkError::DeviceNotFound(name.clone())),
        }
    }

    fn ring_capacity(&self) -> usize {
        let bytes = self.format.byte_rate() as u128 * RING_LATENCY.as_nanos() / 1_000_000_000;
        let frame = self.format.frame_size();
        let bytes = usize::try_from(bytes).unwrap_or(usize::MAX);
        bytes.max(MIN_RING_BYTES) / frame * frame
    }
}

impl AudioContext for CpalContext {
    type Sink = CpalSink;

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn open_sink(&self, voice: &str) -> Result<CpalSink, SinkError> {
        let device = self.device()?;
        let ranges: Vec<ConfigRange> = device
            .supported_output_configs()?
            .map(|range| ConfigRange::from(&range))
            .collect();
        let sample_format =
            choose_sample_format(&ranges, &self.format).ok_or(SinkError::UnsupportedConfig {
                channels: self.format.channels(),
                sample_rate: self.format.sample_rate(),
            })?;
        let config = cpal::StreamConfig {
            channels: self.format.channels(),
            sample_rate: cpal::SampleRate(self.format.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = self.ring_capacity();
        let (producer, consumer) = RingBuffer::<u8>::new(capacity);
        let shared = Arc::new(StreamShared::default());
        let depth = self.format.bit_depth();

        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, depth, consumer, &shared, voice)?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, depth, consumer, &shared, voice)?
            }
            SampleFormat::I32 => {
                build_stream::<i32>(&device, &config, depth, consumer, &shared, voice)?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, depth, consumer, &shared, voice)?
            }
            SampleFormat::U8 => {
                build_stream::<u8>(&device, &config, depth, consumer, &shared, voice)?
            }
            other => return Err(SinkError::UnsupportedSampleFormat(format!("{other:?}"))),
        };
        stream.play()?;

        log::debug!(
            "{voice}: opened {sample_format:?} stream on {} ({} byte ring)",
            device.name().unwrap_or_else(|_| "unnamed device".into()),
            capacity
        );

        Ok(CpalSink {
            voice: voice.to_owned(),
            format: self.format,
            writer: RingWriter::new(producer, Arc::clone(&shared), self.format.frame_size()),
            shared,
            _stream: stream,
        })
    }
}

/// One supported output configuration range, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ConfigRange {
    channels: u16,
    min_rate: u32,
    max_rate: u32,
    sample_format: SampleFormat,
}

impl From<&cpal::SupportedStreamConfigRange> for ConfigRange {
    fn from(range: &cpal::SupportedStreamConfigRange) -> Self {
        Self {
            channels: range.channels(),
            min_rate: range.min_sample_rate().0,
            max_rate: range.max_sample_rate().0,
            sample_format: range.sample_format(),
        }
    }
}

/// Pick the stream sample type for `format`: `f32` when the device takes it,
/// then the PCM depth's own type, then any other integer type.
///
/// `None` when no range offers the requested channel count and sample rate.
fn choose_sample_format(ranges: &[ConfigRange], format: &AudioFormat) -> Option<SampleFormat> {
    let native = match format.bit_depth() {
        BitDepth::Eight => SampleFormat::U8,
        BitDepth::Sixteen => SampleFormat::I16,
    };
    let preference = [
        SampleFormat::F32,
        native,
        SampleFormat::I16,
        SampleFormat::I32,
        SampleFormat::U16,
        SampleFormat::U8,
    ];

    let rate = format.sample_rate();
    let usable: Vec<SampleFormat> = ranges
        .iter()
        .filter(|range| range.channels == format.channels())
        .filter(|range| (range.min_rate..=range.max_rate).contains(&rate))
        .map(|range| range.sample_format)
        .collect();

    preference.into_iter().find(|wanted| usable.contains(wanted))
}

/// Decode one little-endian PCM sample into the -1.0..1.0 range.
fn decode_sample(bytes: &[u8], depth: BitDepth) -> f32 {
    match depth {
        BitDepth::Eight => (bytes[0] as f32 - 128.0) / 128.0,
        BitDepth::Sixteen => i16::from_le_bytes([bytes[0], bytes[1]]) as f32 / 32768.0,
    }
}

/// State the audio callbacks report back to the writing thread.
#[derive(Default)]
struct StreamShared {
    error: Mutex<Option<String>>,
    started: AtomicBool,
    draining: AtomicBool,
    underruns: AtomicU64,
}

impl StreamShared {
    fn fail(&self, message: String) {
        let mut error = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        error.get_or_insert(message);
    }

    fn check(&self) -> Result<(), SinkError> {
        let error = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        match error.as_ref() {
            Some(message) => Err(SinkError::Stream(message.clone())),
            None => Ok(()),
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    depth: BitDepth,
    mut consumer: Consumer<u8>,
    shared: &Arc<StreamShared>,
    voice: &str,
) -> Result<cpal::Stream, SinkError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    let width = depth.bytes();
    let channels = config.channels as usize;
    let frame_bytes = width * channels;
    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);
    let voice = voice.to_owned();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let mut raw = [0u8; 2];
            let mut starved = false;
            // whole frames only, so a short write never shifts the channels
            for frame in data.chunks_mut(channels) {
                if consumer.slots() < frame_bytes {
                    frame.fill(T::EQUILIBRIUM);
                    starved = true;
                    continue;
                }
                for sample in frame.iter_mut() {
                    for byte in raw[..width].iter_mut() {
                        *byte = consumer.pop().unwrap_or(0);
                    }
                    *sample = T::from_sample(decode_sample(&raw[..width], depth));
                }
                data_shared.started.store(true, Ordering::Relaxed);
            }
            if starved
                && data_shared.started.load(Ordering::Relaxed)
                && !data_shared.draining.load(Ordering::Relaxed)
            {
                data_shared.underruns.fetch_add(1, Ordering::Relaxed);
            }
        },
        move |err| {
            log::error!("{voice}: stream error: {err}");
            error_shared.fail(err.to_string());
        },
        None,
    )?;

    Ok(stream)
}

/// Writing half of a note's byte ring.
///
/// Blocks on a full ring and reports errors latched by the audio callbacks.
struct RingWriter {
    producer: Producer<u8>,
    shared: Arc<StreamShared>,
    frame_size: usize,
}

impl RingWriter {
    fn new(producer: Producer<u8>, shared: Arc<StreamShared>, frame_size: usize) -> Self {
        Self {
            producer,
            shared,
            frame_size,
        }
    }

    fn write(&mut self, mut bytes: &[u8]) -> Result<(), SinkError> {
        while !bytes.is_empty() {
            self.shared.check()?;

            let free = self.producer.slots();
            if free == 0 {
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            let chunk = self
                .producer
                .write_chunk_uninit(free.min(bytes.len()))
                .map_err(|err| SinkError::Stream(err.to_string()))?;
            let written = chunk.fill_from_iter(bytes.iter().copied());
            bytes = &bytes[written..];
        }
        Ok(())
    }

    /// Bytes written but not yet taken by the callback.
    fn pending(&self) -> usize {
        self.producer.buffer().capacity() - self.producer.slots()
    }

    /// Wait until less than one frame is left in the ring.
    ///
    /// A trailing partial frame is never played, so it does not count.
    fn drain(&self, deadline: Instant) -> Result<(), SinkError> {
        while self.pending() >= self.frame_size {
            self.shared.check()?;
            if Instant::now() >= deadline {
                return Err(SinkError::Stream(format!(
                    "timed out draining {} bytes",
                    self.pending()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.shared.check()
    }
}

/// One note's output stream.
pub struct CpalSink {
    voice: String,
    format: AudioFormat,
    writer: RingWriter,
    shared: Arc<StreamShared>,
    _stream: cpal::Stream,
}

impl OutputSink for CpalSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writer.write(bytes)
    }

    fn close(self) -> Result<(), SinkError> {
        self.shared.draining.store(true, Ordering::Relaxed);

        let capacity = self.writer.producer.buffer().capacity();
        let deadline = Instant::now() + self.format.duration_of(capacity as u64) + DRAIN_GRACE;
        self.writer.drain(deadline)?;
        thread::sleep(DRAIN_TAIL);
        self.shared.check()?;

        let underruns = self.shared.underruns.load(Ordering::Relaxed);
        if underruns > 0 {
            log::warn!("{}: {underruns} buffer underruns during note", self.voice);
        }
        log::trace!("{}: stream drained", self.voice);
        Ok(())
    }
}
