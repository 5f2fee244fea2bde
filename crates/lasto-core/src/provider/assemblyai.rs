//! AssemblyAI REST client.
//!
//! Three plain HTTPS/JSON calls make up a transcription: upload the audio
//! bytes, submit a transcript job for the returned URL, then poll the job
//! until it completes. The listing endpoint backs the `pull` command, which
//! fetches completed transcripts that are missing locally.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::DEFAULT_TIMEOUT_SECS;
use crate::history::{self, HistoryItem, Utterance, default_speaker_names};

const API_BASE: &str = "https://api.assemblyai.com/v2";

/// Seconds between transcript status polls.
const POLL_INTERVAL_SECS: u64 = 3;

/// Maximum transcripts returned by the listing endpoint.
const LIST_LIMIT: u32 = 100;

/// Uploads can be large; give them a longer window than regular calls.
const UPLOAD_TIMEOUT_SECS: u64 = 600;

/// A submitted job ended in the vendor's `error` state.
#[derive(Debug, Error)]
#[error("Transcription failed: {0}")]
pub struct TranscriptionError(pub String);

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

/// Full transcript resource. Vendor metadata beyond speaker + text (word
/// timings, confidences) is dropped here and never reaches the archive.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptDetail {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub utterances: Option<Vec<ApiUtterance>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUtterance {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptListing {
    #[serde(default)]
    transcripts: Vec<TranscriptSummary>,
}

/// Entry of the transcript listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSummary {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
}

pub struct AssemblyAiClient {
    client: reqwest::Client,
    api_key: String,
}

impl AssemblyAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Upload raw audio bytes; returns the vendor URL to submit for
    /// transcription.
    pub async fn upload(&self, audio: Vec<u8>) -> Result<String> {
        crate::verbose!("Uploading {:.1} KB of audio", audio.len() as f64 / 1024.0);
        let response = self
            .client
            .post(format!("{API_BASE}/upload"))
            .header("Authorization", &self.api_key)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .body(audio)
            .send()
            .await
            .context("Failed to upload audio")?;
        let upload: UploadResponse = read_json(response, "upload").await?;
        Ok(upload.upload_url)
    }

    /// Submit a transcription job with speaker diarization enabled. Returns
    /// the job id, which doubles as the archive record id.
    pub async fn submit(&self, upload_url: &str, language: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{API_BASE}/transcript"))
            .header("Authorization", &self.api_key)
            .json(&serde_json::json!({
                "audio_url": upload_url,
                "language_code": language,
                "speaker_labels": true,
            }))
            .send()
            .await
            .context("Failed to submit transcription job")?;
        let submit: SubmitResponse = read_json(response, "transcript submission").await?;
        Ok(submit.id)
    }

    /// Fetch the current state of a transcript job.
    pub async fn fetch(&self, id: &str) -> Result<TranscriptDetail> {
        let response = self
            .client
            .get(format!("{API_BASE}/transcript/{id}"))
            .header("Authorization", &self.api_key)
            .send()
            .await
            .context("Failed to fetch transcript")?;
        read_json(response, "transcript").await
    }

    /// Poll a job every few seconds until it completes. Fails with
    /// [`TranscriptionError`] when the vendor reports the job as errored.
    pub async fn poll(&self, id: &str) -> Result<TranscriptDetail> {
        loop {
            let detail = self.fetch(id).await?;
            match detail.status.as_str() {
                "completed" => return Ok(detail),
                "error" => {
                    let message = detail
                        .error
                        .unwrap_or_else(|| "no error message from vendor".to_string());
                    return Err(TranscriptionError(message).into());
                }
                status => {
                    crate::verbose!("Transcript {id} status: {status}");
                    tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
                }
            }
        }
    }

    /// Upload, submit and poll in one go.
    pub async fn transcribe(&self, audio: Vec<u8>, language: &str) -> Result<TranscriptDetail> {
        let upload_url = self.upload(audio).await?;
        let id = self.submit(&upload_url, language).await?;
        crate::verbose!("Submitted transcription job {id}");
        self.poll(&id).await
    }

    /// List the most recent completed transcripts on the vendor account.
    pub async fn list_completed(&self) -> Result<Vec<TranscriptSummary>> {
        let response = self
            .client
            .get(format!(
                "{API_BASE}/transcript?limit={LIST_LIMIT}&status=completed"
            ))
            .header("Authorization", &self.api_key)
            .send()
            .await
            .context("Failed to list transcripts")?;
        let listing: TranscriptListing = read_json(response, "transcript listing").await?;
        Ok(listing.transcripts)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::bail!("AssemblyAI {what} error ({status}): {error_text}");
    }
    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to read {what} response"))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {what} response"))
}

/// Keep only summaries created within the inclusive date range. The end date
/// extends to end-of-day; entries with unparsable timestamps are dropped
/// whenever a bound is set.
pub fn filter_created_range(
    summaries: Vec<TranscriptSummary>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<TranscriptSummary> {
    if from.is_none() && to.is_none() {
        return summaries;
    }
    summaries
        .into_iter()
        .filter(|summary| {
            let Some(created) = summary
                .created
                .as_deref()
                .and_then(history::parse_timestamp)
            else {
                return false;
            };
            if let Some(from) = from
                && created < from.and_hms_opt(0, 0, 0).unwrap().and_utc()
            {
                return false;
            }
            if let Some(to) = to
                && created > to.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc()
            {
                return false;
            }
            true
        })
        .collect()
}

/// Keep only summaries whose id is not yet in the local archive.
pub fn select_missing(
    summaries: Vec<TranscriptSummary>,
    known_ids: &HashSet<String>,
) -> Vec<TranscriptSummary> {
    summaries
        .into_iter()
        .filter(|summary| !known_ids.contains(&summary.id))
        .collect()
}

/// Title for a transcript fetched from the vendor account, where no file
/// name is available.
pub fn default_title(created: &str) -> String {
    match history::parse_timestamp(created) {
        Some(ts) => format!("Recording from {}", ts.format("%Y-%m-%d %H:%M")),
        None => format!("Recording from {created}"),
    }
}

/// Build an archive record from a completed transcript.
pub fn item_from_detail(detail: TranscriptDetail, title: String, date: Option<String>) -> HistoryItem {
    HistoryItem {
        id: detail.id,
        title,
        date: date.unwrap_or_else(|| Utc::now().to_rfc3339()),
        content: detail.text.unwrap_or_default(),
        utterances: detail.utterances.map(|list| {
            list.into_iter()
                .map(|u| Utterance {
                    speaker: u.speaker,
                    text: u.text,
                })
                .collect()
        }),
        speaker_names: Some(default_speaker_names()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, created: Option<&str>) -> TranscriptSummary {
        TranscriptSummary {
            id: id.to_string(),
            created: created.map(|c| c.to_string()),
        }
    }

    #[test]
    fn range_filter_is_inclusive_to_end_of_day() {
        let summaries = vec![
            summary("early", Some("2024-03-01T08:00:00Z")),
            summary("last-minute", Some("2024-03-10T23:30:00Z")),
            summary("after", Some("2024-03-11T00:10:00Z")),
        ];
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let kept = filter_created_range(summaries, Some(from), Some(to));
        let ids: Vec<_> = kept.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["early", "last-minute"]);
    }

    #[test]
    fn no_bounds_keeps_everything() {
        let summaries = vec![summary("a", None), summary("b", Some("garbage"))];
        assert_eq!(filter_created_range(summaries, None, None).len(), 2);
    }

    #[test]
    fn unparsable_created_is_dropped_when_bounded() {
        let summaries = vec![summary("a", None), summary("b", Some("2024-03-05 10:00:00"))];
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let kept = filter_created_range(summaries, Some(from), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn select_missing_skips_known_ids() {
        let known: HashSet<String> = ["a".to_string()].into_iter().collect();
        let kept = select_missing(vec![summary("a", None), summary("b", None)], &known);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn detail_parses_with_extra_fields_ignored() {
        let json = r#"{
            "id": "abc",
            "status": "completed",
            "text": "hello",
            "confidence": 0.95,
            "audio_duration": 12,
            "utterances": [
                {"speaker": "A", "text": "hello", "confidence": 0.9, "words": []}
            ]
        }"#;
        let detail: TranscriptDetail = serde_json::from_str(json).unwrap();
        let item = item_from_detail(detail, "t".to_string(), Some("2024-01-01T00:00:00Z".into()));
        assert_eq!(item.content, "hello");
        assert_eq!(item.utterances.as_ref().unwrap().len(), 1);
        assert_eq!(item.speaker_names.as_ref().unwrap()["A"], "Speaker A");
    }

    #[test]
    fn default_title_formats_parsable_dates() {
        assert_eq!(
            default_title("2024-03-20T12:30:00Z"),
            "Recording from 2024-03-20 12:30"
        );
        assert_eq!(default_title("???"), "Recording from ???");
    }
}
