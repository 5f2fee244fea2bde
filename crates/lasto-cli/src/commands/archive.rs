//! Archive browsing and editing commands.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use lasto_core::history::{HistoryItem, parse_timestamp};
use lasto_core::{Archive, Settings};

/// Print every archived recording, newest first.
pub fn list() -> Result<()> {
    let archive = Archive::open_default()?;
    let items = archive.load_all()?;
    if items.is_empty() {
        println!("Archive is empty. Transcribe something with `lasto transcribe <file>`.");
        return Ok(());
    }

    for item in &items {
        let date = parse_timestamp(&item.date)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| item.date.clone());
        println!(
            "{}  {}  {}",
            style(&item.id).dim(),
            style(date).cyan(),
            item.title
        );
    }
    println!("\n{} recording(s)", items.len());
    Ok(())
}

/// Print the junk-filtered transcript of one recording.
pub fn show(id: &str) -> Result<()> {
    let settings = Settings::load();
    let archive = Archive::open_default()?;
    let item = get_required(&archive, id)?;

    println!("{}", style(&item.title).bold());
    println!("{}\n", style(&item.date).dim());
    println!("{}", item.display_text(&settings.junk_filter()));
    Ok(())
}

pub fn rename(id: &str, title: &str) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Title cannot be empty");
    }
    let archive = Archive::open_default()?;
    let mut item = get_required(&archive, id)?;
    item.title = title.to_string();
    archive.save(&item)?;
    println!("Renamed {id} to '{title}'");
    Ok(())
}

/// Set the display name for a speaker label on one recording.
pub fn speaker(id: &str, label: &str, name: &str) -> Result<()> {
    let label = label.to_uppercase();
    if label != "A" && label != "B" {
        anyhow::bail!("Speaker label must be A or B");
    }
    let archive = Archive::open_default()?;
    let mut item = get_required(&archive, id)?;
    item.set_speaker_name(&label, name);
    archive.save(&item)?;
    println!("Speaker {label} is now '{name}'");
    Ok(())
}

pub fn delete(id: &str, yes: bool) -> Result<()> {
    let archive = Archive::open_default()?;
    let item = get_required(&archive, id)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'? This cannot be undone", item.title))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    archive.delete(id)?;
    println!("Deleted '{}'", item.title);
    Ok(())
}

/// Copy a recording's junk-filtered transcript to the clipboard.
pub fn copy(id: &str) -> Result<()> {
    let settings = Settings::load();
    let archive = Archive::open_default()?;
    let item = get_required(&archive, id)?;
    lasto_core::copy_to_clipboard(&item.display_text(&settings.junk_filter()))?;
    println!("Copied '{}' to clipboard", item.title);
    Ok(())
}

fn get_required(archive: &Archive, id: &str) -> Result<HistoryItem> {
    archive
        .get(id)?
        .with_context(|| format!("No recording with id '{id}' (see `lasto list`)"))
}
