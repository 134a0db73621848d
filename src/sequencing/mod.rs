pub mod melody;
pub mod note;
pub mod sequencer;

pub use note::Note;
pub use sequencer::{NoteSequencer, VoiceReport};
