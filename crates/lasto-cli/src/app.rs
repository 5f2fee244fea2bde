use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use lasto_core::Settings;
use std::io::Write;

/// Get the AssemblyAI API key or exit with setup instructions.
pub fn require_api_key(settings: &Settings) -> String {
    match settings.api_key() {
        Some(key) => key,
        None => {
            eprintln!("Error: No AssemblyAI API key configured.");
            eprintln!("\nSet your key with:");
            eprintln!("  lasto config --assemblyai-api-key YOUR_KEY\n");
            eprintln!("Or set the {} environment variable.", lasto_core::settings::ASSEMBLYAI_KEY_ENV);
            eprintln!("Keys are available at https://www.assemblyai.com/dashboard");
            std::process::exit(1);
        }
    }
}

/// Get the Pantry id or exit with setup instructions.
pub fn require_pantry_id(settings: &Settings) -> String {
    match settings.pantry_id() {
        Some(id) => id,
        None => {
            eprintln!("Error: No Pantry id configured.");
            eprintln!("\nSet it with:");
            eprintln!("  lasto config --pantry-id YOUR_PANTRY_ID\n");
            eprintln!("Or set the {} environment variable.", lasto_core::settings::PANTRY_ID_ENV);
            eprintln!("Create a free pantry at https://getpantry.cloud/");
            std::process::exit(1);
        }
    }
}

pub fn wait_for_enter() -> Result<()> {
    std::io::stdout().flush()?;

    // Enable raw mode to read keypresses without echoing
    enable_raw_mode()?;

    // Wait for Enter key
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.code == KeyCode::Enter {
                break;
            }
        }
    }

    // Restore normal mode
    disable_raw_mode()?;

    Ok(())
}
