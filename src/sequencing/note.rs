use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One step of a melody: a pitch held for a duration, or a rest.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Frequency in Hz (None = rest)
    pub pitch: Option<f64>,
    /// How long the note (or the silence) lasts
    pub duration: Duration,
}

impl Note {
    pub const fn tone(frequency: f64, duration: Duration) -> Self {
        Self {
            pitch: Some(frequency),
            duration,
        }
    }

    pub const fn rest(duration: Duration) -> Self {
        Self {
            pitch: None,
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
}

/// Total playing time of a note list.
pub fn total_duration(notes: &[Note]) -> Duration {
    notes.iter().map(|note| note.duration).sum()
}
