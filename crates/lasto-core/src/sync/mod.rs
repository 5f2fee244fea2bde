//! Cloud backup of the archive.

mod pantry;

pub use pantry::{BASKET, CHUNK_SIZE, PantryClient, chunk_payloads, reassemble};
