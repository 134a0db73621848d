//! Round runner - wires the built-in melody to a scheduler

use color_eyre::eyre::{eyre, Result as EyreResult};
use saavy_round::{
    engine::VoiceScheduler,
    io::AudioContext,
    sequencing::{
        melody::{round_melody, round_voices},
        note::total_duration,
    },
};

/// Play the round on `context`, failing if any voice stopped early.
pub fn play_round<C: AudioContext>(context: &C, chunk_size: usize) -> EyreResult<()> {
    let format = context.format();
    let notes = round_melody();
    let voices = round_voices();

    log::info!(
        "{} Hz, {} channels, {}-bit",
        format.sample_rate(),
        format.channels(),
        format.bit_depth().bytes() * 8
    );
    log::info!(
        "{} voices, {} notes, {:?} per voice",
        voices.len(),
        notes.len(),
        total_duration(&notes)
    );

    let outcomes = VoiceScheduler::new(context)
        .voices(voices)
        .chunk_size(chunk_size)
        .run(&notes);

    let failed: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|err| format!("{}: {err}", outcome.voice))
        })
        .collect();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} voice(s) failed: {}", failed.len(), failed.join("; ")))
    }
}
