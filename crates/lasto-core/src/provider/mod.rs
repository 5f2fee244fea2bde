//! Transcription vendor clients.

mod assemblyai;

pub use assemblyai::{
    ApiUtterance, AssemblyAiClient, TranscriptDetail, TranscriptSummary, TranscriptionError,
    default_title, filter_created_range, item_from_detail, select_missing,
};

/// Default per-request timeout for vendor API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
