//! saavy-round - plays the built-in three-voice round
//!
//! Run with: cargo run -- --sample-rate 48000

mod app;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_round::{
    io::{
        cpal_sink::CpalContext,
        format::{DEFAULT_BIT_DEPTH_BYTES, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE},
        null::NullContext,
    },
    sequencing::sequencer::DEFAULT_CHUNK_SIZE,
    AudioFormat,
};

/// Sine, triangle and pulse voices singing a round, synthesized sample by sample.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Number of output channels
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    channels: u16,

    /// Bytes per sample (1 or 2)
    #[arg(long, default_value_t = DEFAULT_BIT_DEPTH_BYTES)]
    bit_depth: u8,

    /// Output device name (default device if omitted)
    #[arg(long)]
    device: Option<String>,

    /// Discard audio but keep real-time pacing
    #[arg(long)]
    silent: bool,

    /// Bytes pulled from a generator per write
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let format = AudioFormat::new(args.sample_rate, args.channels, args.bit_depth)
        .wrap_err("invalid audio format")?;

    if args.silent {
        app::play_round(&NullContext::new(format), args.chunk_size)
    } else {
        let mut context = CpalContext::new(format);
        if let Some(device) = args.device {
            context = context.with_device(device);
        }
        app::play_round(&context, args.chunk_size)
    }
}
