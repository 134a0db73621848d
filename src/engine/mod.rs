pub mod scheduler;

pub use scheduler::{Voice, VoiceOutcome, VoiceScheduler};
