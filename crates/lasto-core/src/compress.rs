//! Compressed transport records for the cloud basket.
//!
//! Pantry baskets have a per-request size limit, so records are shipped as a
//! size-reduced projection: single-letter field names, utterances cut down to
//! speaker + text, and the full `content` dropped entirely (it is rebuilt
//! from the utterances on the way back). This format exists only on the
//! wire; the archive always stores full records.

use serde::{Deserialize, Serialize};

use crate::history::{HistoryItem, SpeakerMap, Utterance};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedUtterance {
    #[serde(rename = "s")]
    pub speaker: String,
    #[serde(rename = "t")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedRecord {
    pub id: String,
    #[serde(rename = "ti")]
    pub title: String,
    #[serde(rename = "da")]
    pub date: String,
    #[serde(rename = "sn", default, skip_serializing_if = "Option::is_none")]
    pub speaker_names: Option<SpeakerMap>,
    #[serde(rename = "u", default)]
    pub utterances: Vec<CompressedUtterance>,
    /// Explicit content override. Normally absent; older baskets may carry it.
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Project full records down to the transport format.
pub fn compress(items: &[HistoryItem]) -> Vec<CompressedRecord> {
    items
        .iter()
        .map(|item| CompressedRecord {
            id: item.id.clone(),
            title: item.title.clone(),
            date: item.date.clone(),
            speaker_names: item.speaker_names.clone(),
            utterances: item
                .utterances
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|u| CompressedUtterance {
                    speaker: u.speaker.clone(),
                    text: u.text.clone(),
                })
                .collect(),
            content: None,
        })
        .collect()
}

/// Rebuild full records from the transport format. Content is reconstructed
/// by joining utterance texts unless the record carries an explicit `c`.
pub fn decompress(records: Vec<CompressedRecord>) -> Vec<HistoryItem> {
    records
        .into_iter()
        .map(|record| {
            let utterances: Vec<Utterance> = record
                .utterances
                .into_iter()
                .map(|u| Utterance {
                    speaker: u.speaker,
                    text: u.text,
                })
                .collect();
            let content = record
                .content
                .unwrap_or_else(|| {
                    utterances
                        .iter()
                        .map(|u| u.text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n")
                });
            HistoryItem {
                id: record.id,
                title: record.title,
                date: record.date,
                content,
                utterances: Some(utterances),
                speaker_names: record.speaker_names,
            }
        })
        .collect()
}
