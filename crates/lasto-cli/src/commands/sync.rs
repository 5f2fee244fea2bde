//! Reconciliation with the vendor account, the cloud basket, and disk backups.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use lasto_core::provider::{default_title, filter_created_range, item_from_detail, select_missing};
use lasto_core::{Archive, AssemblyAiClient, PantryClient, Settings, merge_history};

use crate::app;

/// Fetch completed transcripts from the AssemblyAI account that are missing
/// locally, optionally restricted to an inclusive created-date range.
pub async fn pull(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    let settings = Settings::load();
    let api_key = app::require_api_key(&settings);
    let archive = Archive::open_default()?;

    let client = AssemblyAiClient::new(api_key)?;
    let summaries = client.list_completed().await?;
    let summaries = filter_created_range(summaries, from, to);

    let known_ids: HashSet<String> = archive
        .load_all()?
        .into_iter()
        .map(|item| item.id)
        .collect();
    let missing = select_missing(summaries, &known_ids);

    if missing.is_empty() {
        println!("No new recordings in the selected range.");
        return Ok(());
    }

    let total = missing.len();
    let mut added = 0;
    for (index, summary) in missing.into_iter().enumerate() {
        println!("Fetching {} of {total}...", index + 1);
        let detail = match client.fetch(&summary.id).await {
            Ok(detail) => detail,
            Err(err) => {
                // One broken transcript should not abort the whole pull.
                eprintln!("Skipping {}: {err}", summary.id);
                continue;
            }
        };
        let created = summary.created.unwrap_or_else(|| Utc::now().to_rfc3339());
        let item = item_from_detail(detail, default_title(&created), Some(created));
        archive.save(&item)?;
        added += 1;
    }

    println!("Fetched {added} recording(s) into the local archive.");
    Ok(())
}

/// Back up the whole archive to the Pantry basket.
pub async fn push() -> Result<()> {
    let settings = Settings::load();
    let pantry_id = app::require_pantry_id(&settings);
    let archive = Archive::open_default()?;

    let items = archive.load_all()?;
    if items.is_empty() {
        println!("Archive is empty, nothing to back up.");
        return Ok(());
    }

    let client = PantryClient::new(pantry_id)?;
    let chunks = client.push(&items).await?;
    println!(
        "Backed up {} recording(s) in {chunks} chunk(s).",
        items.len()
    );
    Ok(())
}

/// Download the cloud basket and merge it into the archive. Cloud records
/// win on id conflicts.
pub async fn sync_down() -> Result<()> {
    let settings = Settings::load();
    let pantry_id = app::require_pantry_id(&settings);
    let archive = Archive::open_default()?;

    let client = PantryClient::new(pantry_id)?;
    let remote = client.pull().await?;
    let remote_count = remote.len();

    let merged = merge_history(remote, archive.load_all()?);
    for item in &merged {
        archive.save(item)?;
    }

    println!(
        "Merged {remote_count} cloud recording(s); the archive now holds {}.",
        merged.len()
    );
    Ok(())
}

/// Export the archive as a JSON array.
pub fn export(path: &Path) -> Result<()> {
    let archive = Archive::open_default()?;
    let count = archive.export(path)?;
    println!("Exported {count} recording(s) to {}", path.display());
    Ok(())
}

/// Import a JSON array of recordings; imported records win on id conflicts.
pub fn import(path: &Path) -> Result<()> {
    let archive = Archive::open_default()?;
    let count = archive.import(path)?;
    println!("Imported {count} recording(s) from {}", path.display());
    Ok(())
}
