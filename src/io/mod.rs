// Purpose: external interfaces, audio format and output sinks

#[cfg(feature = "rtrb")]
pub mod cpal_sink;
pub mod format;
pub mod memory;
pub mod null;
pub mod sink;

pub use sink::{AudioContext, OutputSink};
