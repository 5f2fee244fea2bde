//! Microphone capture for vendor upload.

mod recorder;

pub use recorder::Recorder;
