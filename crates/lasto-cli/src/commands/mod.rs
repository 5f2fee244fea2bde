pub mod archive;
pub mod config;
pub mod sync;
pub mod transcribe;
