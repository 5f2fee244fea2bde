//! Chunked archive backup against a Pantry Cloud basket.
//!
//! Pantry stores one JSON document per basket and rejects oversized
//! requests, so the archive is shipped as compressed records split into
//! fixed-size chunks. Each chunk is POSTed separately under its own
//! `chunk_<i>` key together with a manifest; Pantry merges posted keys into
//! the basket document, so after the last POST the basket holds every chunk
//! plus the manifest describing how many there are.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;

use crate::compress::{self, CompressedRecord};
use crate::history::HistoryItem;
use crate::provider::DEFAULT_TIMEOUT_SECS;

const PANTRY_BASE: &str = "https://getpantry.cloud/apiv1/pantry";

/// Basket name holding the archive mirror.
pub const BASKET: &str = "lastoHistory";

/// Compressed records per chunk. Sized so a chunk of typical transcripts
/// stays under Pantry's request limit.
pub const CHUNK_SIZE: usize = 50;

pub struct PantryClient {
    client: reqwest::Client,
    pantry_id: String,
}

impl PantryClient {
    pub fn new(pantry_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            pantry_id: pantry_id.into().trim().to_string(),
        })
    }

    fn basket_url(&self) -> String {
        format!("{PANTRY_BASE}/{}/basket/{BASKET}", self.pantry_id)
    }

    /// Compress and upload the archive. Returns the number of chunks sent.
    pub async fn push(&self, items: &[HistoryItem]) -> Result<usize> {
        let records = compress::compress(items);
        let payloads = chunk_payloads(&records, Utc::now().timestamp_millis())?;
        let total = payloads.len();

        for (index, payload) in payloads.into_iter().enumerate() {
            crate::verbose!("Uploading chunk {} of {total}", index + 1);
            let response = self
                .client
                .post(self.basket_url())
                .json(&payload)
                .send()
                .await
                .with_context(|| format!("Failed to upload chunk {index}"))?;
            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                anyhow::bail!("Pantry rejected chunk {index} ({status}): {error_text}");
            }
        }
        Ok(total)
    }

    /// Download the basket and rebuild the full records from its chunks.
    pub async fn pull(&self) -> Result<Vec<HistoryItem>> {
        let response = self
            .client
            .get(self.basket_url())
            .send()
            .await
            .context("Failed to fetch cloud basket")?;
        if !response.status().is_success() {
            anyhow::bail!("No cloud archive found ({})", response.status());
        }
        let basket: Value = response
            .json()
            .await
            .context("Cloud basket is not valid JSON")?;
        let records = reassemble(&basket)?;
        Ok(compress::decompress(records))
    }
}

/// Split compressed records into per-chunk POST payloads. Every payload
/// repeats the manifest, so the basket ends up with a consistent one no
/// matter which POST lands last.
pub fn chunk_payloads(records: &[CompressedRecord], timestamp_ms: i64) -> Result<Vec<Value>> {
    let chunks: Vec<&[CompressedRecord]> = records.chunks(CHUNK_SIZE).collect();
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut payload = serde_json::Map::new();
            payload.insert(
                format!("chunk_{index}"),
                serde_json::to_value(chunk).context("Failed to serialize chunk")?,
            );
            payload.insert(
                "manifest".to_string(),
                serde_json::json!({ "totalChunks": total, "timestamp": timestamp_ms }),
            );
            Ok(Value::Object(payload))
        })
        .collect()
}

/// Reassemble compressed records from a basket document. Prefers the
/// chunked layout described by the manifest; baskets written before
/// chunking carry a plain `history` array of full records instead.
pub fn reassemble(basket: &Value) -> Result<Vec<CompressedRecord>> {
    if let Some(total) = basket
        .get("manifest")
        .and_then(|m| m.get("totalChunks"))
        .and_then(Value::as_u64)
    {
        let mut records = Vec::new();
        for index in 0..total {
            let Some(chunk) = basket.get(format!("chunk_{index}")) else {
                crate::verbose!("Basket is missing chunk_{index}, skipping");
                continue;
            };
            if !chunk.is_array() {
                continue;
            }
            let mut parsed: Vec<CompressedRecord> = serde_json::from_value(chunk.clone())
                .with_context(|| format!("Failed to parse chunk_{index}"))?;
            records.append(&mut parsed);
        }
        return Ok(records);
    }

    if let Some(history) = basket.get("history") {
        let items: Vec<HistoryItem> = serde_json::from_value(history.clone())
            .context("Failed to parse legacy history basket")?;
        return Ok(compress::compress(&items));
    }

    anyhow::bail!("Cloud basket is empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Utterance;

    fn item(id: &str) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            title: format!("title {id}"),
            date: "2024-01-01T00:00:00Z".to_string(),
            content: "hello".to_string(),
            utterances: Some(vec![Utterance {
                speaker: "A".to_string(),
                text: "hello".to_string(),
            }]),
            speaker_names: None,
        }
    }

    fn records(count: usize) -> Vec<CompressedRecord> {
        let items: Vec<HistoryItem> = (0..count).map(|i| item(&format!("rec-{i}"))).collect();
        compress::compress(&items)
    }

    #[test]
    fn chunking_respects_the_size_limit() {
        let payloads = chunk_payloads(&records(120), 1234).unwrap();
        assert_eq!(payloads.len(), 3);

        assert_eq!(payloads[0]["chunk_0"].as_array().unwrap().len(), 50);
        assert_eq!(payloads[1]["chunk_1"].as_array().unwrap().len(), 50);
        assert_eq!(payloads[2]["chunk_2"].as_array().unwrap().len(), 20);
        for payload in &payloads {
            assert_eq!(payload["manifest"]["totalChunks"], 3);
            assert_eq!(payload["manifest"]["timestamp"], 1234);
        }
    }

    #[test]
    fn empty_archive_produces_no_payloads() {
        assert!(chunk_payloads(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn reassemble_inverts_chunking() {
        let original = records(120);
        let payloads = chunk_payloads(&original, 0).unwrap();

        // Pantry merges posted keys into one basket document.
        let mut basket = serde_json::Map::new();
        for payload in payloads {
            for (key, value) in payload.as_object().unwrap() {
                basket.insert(key.clone(), value.clone());
            }
        }

        let restored = reassemble(&Value::Object(basket)).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn reassemble_tolerates_missing_chunks() {
        let payloads = chunk_payloads(&records(120), 0).unwrap();
        let mut basket = payloads[0].as_object().unwrap().clone();
        for (key, value) in payloads[2].as_object().unwrap() {
            basket.insert(key.clone(), value.clone());
        }

        // chunk_1 never arrived; the rest should still come back.
        let restored = reassemble(&Value::Object(basket)).unwrap();
        assert_eq!(restored.len(), 70);
    }

    #[test]
    fn reassemble_reads_legacy_history_baskets() {
        let basket = serde_json::json!({
            "history": [item("legacy-1"), item("legacy-2")],
        });
        let restored = reassemble(&basket).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].id, "legacy-1");
    }

    #[test]
    fn reassemble_rejects_empty_baskets() {
        assert!(reassemble(&serde_json::json!({})).is_err());
    }
}
