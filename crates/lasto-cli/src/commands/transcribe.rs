//! Transcription entry points: file import and microphone recording.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use lasto_core::provider::{default_title, item_from_detail};
use lasto_core::{Archive, AssemblyAiClient, Recorder, Settings};

use crate::app;

/// Transcribe an audio file and archive the result under the file's name.
pub async fn transcribe_file(path: &Path) -> Result<()> {
    let settings = Settings::load();
    let api_key = app::require_api_key(&settings);

    let audio = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let title = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording")
        .to_string();

    run_transcription(&settings, &api_key, audio, title).await
}

/// Record from the microphone until Enter, then transcribe and archive.
pub async fn record() -> Result<()> {
    let settings = Settings::load();
    let api_key = app::require_api_key(&settings);

    let recorder = Recorder::start()?;
    print!("Recording... press Enter to stop ");
    tokio::task::spawn_blocking(app::wait_for_enter)
        .await
        .context("Keyboard listener panicked")??;
    println!();
    let audio = recorder.stop()?;

    let title = default_title(&Utc::now().to_rfc3339());
    run_transcription(&settings, &api_key, audio, title).await
}

async fn run_transcription(
    settings: &Settings,
    api_key: &str,
    audio: Vec<u8>,
    title: String,
) -> Result<()> {
    let client = AssemblyAiClient::new(api_key)?;

    println!("Uploading...");
    let upload_url = client.upload(audio).await?;
    let id = client.submit(&upload_url, &settings.language).await?;
    println!("Transcribing (job {id})...");
    let detail = client.poll(&id).await?;

    let item = item_from_detail(detail, title, None);
    let archive = Archive::open_default()?;
    archive.save(&item)?;

    println!(
        "Saved '{}' ({})\n",
        console::style(&item.title).bold(),
        item.id
    );
    println!("{}", item.display_text(&settings.junk_filter()));
    Ok(())
}
