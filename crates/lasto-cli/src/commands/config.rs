//! Configuration command: show or update settings.

use anyhow::Result;
use clap::Args;
use lasto_core::Settings;

#[derive(Args)]
pub struct ConfigArgs {
    /// Set the AssemblyAI API key
    #[arg(long, value_name = "KEY")]
    assemblyai_api_key: Option<String>,

    /// Set the Pantry id for cloud backup
    #[arg(long, value_name = "ID")]
    pantry_id: Option<String>,

    /// Set the transcription language code (e.g. pl, en)
    #[arg(long, value_name = "CODE")]
    language: Option<String>,

    /// Show the current configuration
    #[arg(long)]
    show: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();
    let mut changed = false;

    if let Some(key) = args.assemblyai_api_key {
        settings.assemblyai_api_key = Some(key);
        println!("AssemblyAI API key updated");
        changed = true;
    }
    if let Some(id) = args.pantry_id {
        settings.pantry_id = Some(id.trim().to_string());
        println!("Pantry id updated");
        changed = true;
    }
    if let Some(language) = args.language {
        settings.language = language;
        println!("Language updated");
        changed = true;
    }

    if changed {
        settings.save()?;
    }
    if args.show || !changed {
        print_settings(&settings)?;
    }
    Ok(())
}

fn print_settings(settings: &Settings) -> Result<()> {
    println!("Settings file: {}", Settings::path()?.display());
    println!(
        "  AssemblyAI API key: {}",
        settings.api_key().map(mask).unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "  Pantry id:          {}",
        settings.pantry_id().map(mask).unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  Language:           {}", settings.language);
    Ok(())
}

/// Secrets are shown by prefix only, enough to tell keys apart.
fn mask(secret: String) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}
