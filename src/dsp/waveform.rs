#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::io::format::BitDepth;

/*
Tone Waveforms
==============

Every waveform here is a pure function of the frame position inside a note,
so a generator can resume synthesis at any frame without carrying phase state
between pulls.

  cycle = sample_rate / frequency     (frames per period, fractional)

Sine: sin(2π · pos / cycle) at 10% of full scale.
  16-bit output is boosted by √2 so it sits at roughly the same loudness as
  the 8-bit rendering.

Triangle: linear ramps over half-cycles.
  Even half-cycles ramp down from +1 to -1, odd half-cycles ramp up from -1
  to +1. 10% of full scale, 16-bit boosted by √3.

Pulse: 50% duty, biased positive.
  First half of the (truncated) cycle sits at 0.3 · max, second half at 0.
  It never goes negative.

Frequencies too high for the shape (a truncated cycle or half-cycle of zero
frames) render silence.
*/

/// Fraction of full scale used by sine and triangle.
pub const VOLUME: f64 = 0.1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveShape {
    Sine,
    Triangle,
    Pulse,
}

impl WaveShape {
    pub const ALL: [WaveShape; 3] = [WaveShape::Sine, WaveShape::Triangle, WaveShape::Pulse];

    /// Signed amplitude of frame `pos` for a period of `cycle` frames.
    ///
    /// The result is already scaled to `depth` and truncated toward zero.
    pub fn amplitude(self, pos: u64, cycle: f64, depth: BitDepth) -> i32 {
        let max = depth.max_amplitude();
        match self {
            WaveShape::Pulse => pulse(pos, cycle, max),
            WaveShape::Triangle => {
                let gain = match depth {
                    BitDepth::Eight => 1.0,
                    BitDepth::Sixteen => 3.0_f64.sqrt(),
                };
                triangle(pos, cycle, max, gain)
            }
            WaveShape::Sine => {
                let gain = match depth {
                    BitDepth::Eight => 1.0,
                    BitDepth::Sixteen => std::f64::consts::SQRT_2,
                };
                let angle = std::f64::consts::TAU * pos as f64 / cycle;
                (angle.sin() * VOLUME * max as f64 * gain) as i32
            }
        }
    }

    /// Level of the high half of a pulse for `depth`.
    pub const fn pulse_level(depth: BitDepth) -> i32 {
        depth.max_amplitude() / 10 * 3
    }
}

fn pulse(pos: u64, cycle: f64, max: i32) -> i32 {
    let period = cycle as u64;
    if period == 0 {
        return 0;
    }
    if pos % period < period / 2 {
        max / 10 * 3
    } else {
        0
    }
}

fn triangle(pos: u64, cycle: f64, max: i32, gain: f64) -> i32 {
    let half = (cycle / 2.0) as u64;
    if half == 0 {
        return 0;
    }
    let phase = (pos % half) as f64;
    let quarter = cycle / 4.0;
    let ramp = if (pos / half) % 2 == 0 {
        1.0 - phase / quarter
    } else {
        phase / quarter - 1.0
    };
    (ramp * max as f64 * VOLUME * gain) as i32
}
