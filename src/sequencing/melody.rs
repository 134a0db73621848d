/*
Built-in Round
==============

A short children's-song style melody in C major, played as a three-part
round: every voice plays the same notes with its own waveform, entering
four seconds after the previous one.

  voice     shape      enters at
  sine      Sine       0s
  triangle  Triangle   4s
  pulse     Pulse      8s

Pitch constants are in Hz for the octave above middle C (C5 = 523.3 Hz),
rounded to one decimal.
*/

use std::time::Duration;

use crate::{dsp::waveform::WaveShape, engine::scheduler::Voice, sequencing::note::Note};

pub const C5: f64 = 523.3;
pub const D5: f64 = 587.3;
pub const E5: f64 = 659.3;
pub const F5: f64 = 698.5;
pub const G5: f64 = 784.0;
pub const A5: f64 = 880.1;

const WHOLE: Duration = Duration::from_secs(1);
const HALF: Duration = Duration::from_millis(500);

/// Delay between the entries of consecutive voices.
pub const ENTRY_INTERVAL: Duration = Duration::from_secs(4);

const fn tone(pitch: f64, duration: Duration) -> Note {
    Note::tone(pitch, duration)
}

const fn rest(duration: Duration) -> Note {
    Note::rest(duration)
}

const ROUND: [Note; 38] = [
    // bar 1-2
    tone(C5, WHOLE),
    tone(D5, WHOLE),
    tone(E5, WHOLE),
    tone(F5, WHOLE),
    tone(E5, WHOLE),
    tone(D5, WHOLE),
    tone(C5, WHOLE),
    rest(WHOLE),
    // bar 3-4
    tone(E5, WHOLE),
    tone(F5, WHOLE),
    tone(G5, WHOLE),
    tone(A5, WHOLE),
    tone(G5, WHOLE),
    tone(F5, WHOLE),
    tone(E5, WHOLE),
    rest(WHOLE),
    // bar 5-6
    tone(C5, WHOLE),
    rest(WHOLE),
    tone(C5, WHOLE),
    rest(WHOLE),
    tone(C5, WHOLE),
    rest(WHOLE),
    tone(C5, WHOLE),
    rest(WHOLE),
    // bar 7
    tone(C5, HALF),
    tone(C5, HALF),
    tone(D5, HALF),
    tone(D5, HALF),
    tone(E5, HALF),
    tone(E5, HALF),
    tone(F5, HALF),
    tone(F5, HALF),
    // bar 8
    tone(E5, HALF),
    rest(HALF),
    tone(D5, HALF),
    rest(HALF),
    tone(C5, HALF),
    rest(Duration::from_millis(1_500)),
];

/// The note list every voice of the round plays.
pub fn round_melody() -> Vec<Note> {
    ROUND.to_vec()
}

/// The three voices of the round, in entry order.
pub fn round_voices() -> Vec<Voice> {
    WaveShape::ALL
        .iter()
        .zip(0u32..)
        .map(|(&shape, entry)| {
            Voice::new(voice_name(shape), shape).start_after(ENTRY_INTERVAL * entry)
        })
        .collect()
}

/// Conventional voice name for a waveform.
pub fn voice_name(shape: WaveShape) -> &'static str {
    match shape {
        WaveShape::Sine => "sine",
        WaveShape::Triangle => "triangle",
        WaveShape::Pulse => "pulse",
    }
}
