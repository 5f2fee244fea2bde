//! Transcript data model and reconciliation.
//!
//! A `HistoryItem` is one archived recording: the vendor transcript plus the
//! user-editable title and speaker names. The local archive owns these
//! records; cloud copies are a detached best-effort mirror, so merging is
//! always by id with one side preferred.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::JunkFilter;

/// Speaker label (as emitted by the vendor) to display name.
pub type SpeakerMap = HashMap<String, String>;

/// One speaker-attributed segment of a transcript. Immutable once produced
/// by the vendor; extra vendor fields (timings, confidences) are dropped at
/// the API boundary and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
}

/// An archived recording. Field names in JSON match the disk-export format,
/// so archives exported by older builds import cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    /// ISO-8601 timestamp, from the vendor's `created` field or set at
    /// import time.
    pub date: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterances: Option<Vec<Utterance>>,
    #[serde(
        default,
        rename = "speakerNames",
        skip_serializing_if = "Option::is_none"
    )]
    pub speaker_names: Option<SpeakerMap>,
}

/// Default display names assigned to fresh transcripts.
pub fn default_speaker_names() -> SpeakerMap {
    let mut names = SpeakerMap::new();
    names.insert("A".to_string(), "Speaker A".to_string());
    names.insert("B".to_string(), "Speaker B".to_string());
    names
}

/// Fold vendor speaker labels onto the two-party keys used for naming.
/// The vendor emits letters or digits depending on the diarization path.
pub fn canonical_label(speaker: &str) -> &'static str {
    if speaker == "A" || speaker == "1" {
        "A"
    } else {
        "B"
    }
}

impl HistoryItem {
    /// Resolve the display name for a speaker label, falling back to the
    /// built-in defaults when the user has not renamed the speaker.
    pub fn speaker_name(&self, label: &str) -> String {
        if let Some(names) = &self.speaker_names
            && let Some(name) = names.get(label)
        {
            return name.clone();
        }
        match label {
            "A" => "Speaker A".to_string(),
            "B" => "Speaker B".to_string(),
            other => format!("Speaker {other}"),
        }
    }

    /// Set the display name for a speaker label.
    pub fn set_speaker_name(&mut self, label: &str, name: &str) {
        self.speaker_names
            .get_or_insert_with(SpeakerMap::new)
            .insert(label.to_string(), name.to_string());
    }

    /// Render the transcript for display: junk utterances removed, each
    /// remaining one attributed to its (renamable) speaker. Falls back to
    /// the raw content when the vendor returned no utterances.
    pub fn display_text(&self, filter: &JunkFilter) -> String {
        let Some(utterances) = self.utterances.as_deref() else {
            return self.content.clone();
        };
        if utterances.is_empty() {
            return self.content.clone();
        }

        utterances
            .iter()
            .enumerate()
            .filter(|(index, u)| !filter.is_junk(&u.text, *index))
            .map(|(_, u)| {
                let name = self.speaker_name(canonical_label(&u.speaker));
                format!("{}:\n{}\n", name.to_uppercase(), u.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sort_key(&self) -> DateTime<Utc> {
        parse_timestamp(&self.date).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Parse a vendor or archive timestamp. The transcript listing uses a naive
/// `YYYY-MM-DD HH:MM:SS.ffffff` format while archived records carry RFC 3339,
/// so both are accepted. Naive timestamps are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Sort newest-first. Records with unparsable dates sort last.
pub fn sort_by_date_desc(items: &mut [HistoryItem]) {
    items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

/// Merge two record sets by id: `preferred` wins on conflicts, duplicates
/// are dropped, and the result is sorted newest-first.
pub fn merge_history(
    preferred: Vec<HistoryItem>,
    existing: Vec<HistoryItem>,
) -> Vec<HistoryItem> {
    let mut seen = HashSet::new();
    let mut merged: Vec<HistoryItem> = preferred
        .into_iter()
        .chain(existing)
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    sort_by_date_desc(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, date: &str, title: &str) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            content: String::new(),
            utterances: None,
            speaker_names: None,
        }
    }

    #[test]
    fn merge_prefers_first_set_and_sorts_desc() {
        let preferred = vec![
            item("a", "2024-03-02T10:00:00Z", "remote a"),
            item("b", "2024-03-01T10:00:00Z", "remote b"),
        ];
        let existing = vec![
            item("a", "2024-03-02T10:00:00Z", "local a"),
            item("c", "2024-03-03T10:00:00Z", "local c"),
        ];

        let merged = merge_history(preferred, existing);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, "c");
        assert_eq!(merged[1].id, "a");
        assert_eq!(merged[1].title, "remote a");
        assert_eq!(merged[2].id, "b");
    }

    #[test]
    fn unparsable_dates_sort_last() {
        let mut items = vec![
            item("bad", "not a date", ""),
            item("new", "2024-06-01T00:00:00Z", ""),
            item("old", "2020-01-01T00:00:00Z", ""),
        ];
        sort_by_date_desc(&mut items);
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");
        assert_eq!(items[2].id, "bad");
    }

    #[test]
    fn parses_vendor_listing_timestamps() {
        assert!(parse_timestamp("2024-03-20T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-20 12:00:00.730000").is_some());
        assert!(parse_timestamp("garbage").is_none());
    }

    #[test]
    fn display_text_falls_back_to_content() {
        let mut it = item("x", "2024-01-01T00:00:00Z", "t");
        it.content = "plain transcript".to_string();
        assert_eq!(it.display_text(&JunkFilter::default()), "plain transcript");

        it.utterances = Some(vec![]);
        assert_eq!(it.display_text(&JunkFilter::default()), "plain transcript");
    }

    #[test]
    fn display_text_attributes_and_filters() {
        let mut it = item("x", "2024-01-01T00:00:00Z", "t");
        it.utterances = Some(vec![
            Utterance {
                speaker: "A".to_string(),
                text: "Prosimy poczekać na połączenie.".to_string(),
            },
            Utterance {
                speaker: "1".to_string(),
                text: "Dzień dobry.".to_string(),
            },
            Utterance {
                speaker: "2".to_string(),
                text: "Witam.".to_string(),
            },
        ]);
        it.set_speaker_name("A", "Anna");

        let text = it.display_text(&JunkFilter::default());
        assert_eq!(text, "ANNA:\nDzień dobry.\n\nSPEAKER B:\nWitam.\n");
    }

    #[test]
    fn speaker_name_defaults() {
        let it = item("x", "2024-01-01T00:00:00Z", "t");
        assert_eq!(it.speaker_name("A"), "Speaker A");
        assert_eq!(it.speaker_name("B"), "Speaker B");
        assert_eq!(it.speaker_name("C"), "Speaker C");
        assert_eq!(canonical_label("1"), "A");
        assert_eq!(canonical_label("2"), "B");
    }
}
