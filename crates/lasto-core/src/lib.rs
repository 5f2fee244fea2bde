pub mod archive;
pub mod audio;
#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod compress;
pub mod filter;
pub mod history;
pub mod provider;
pub mod settings;
pub mod sync;
pub mod verbose;

pub use archive::Archive;
pub use audio::Recorder;
#[cfg(feature = "clipboard")]
pub use clipboard::copy_to_clipboard;
pub use compress::{CompressedRecord, compress, decompress};
pub use filter::{DEFAULT_JUNK_PHRASES, JunkFilter};
pub use history::{HistoryItem, SpeakerMap, Utterance, merge_history, sort_by_date_desc};
pub use provider::{AssemblyAiClient, DEFAULT_TIMEOUT_SECS, TranscriptionError};
pub use settings::Settings;
pub use sync::PantryClient;
pub use verbose::set_verbose;
