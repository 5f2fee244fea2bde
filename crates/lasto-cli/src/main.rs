mod app;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lasto", version, about = "Transcribe recordings and archive them locally, with cloud backup")]
struct Cli {
    /// Print verbose diagnostics
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio file and archive the result
    Transcribe {
        /// Audio file to transcribe (WAV, MP3, M4A, ...)
        file: PathBuf,
    },
    /// Record from the microphone, then transcribe and archive
    Record,
    /// List archived recordings
    List,
    /// Print a recording's transcript
    Show {
        /// Recording id (see `lasto list`)
        id: String,
    },
    /// Rename a recording
    Rename { id: String, title: String },
    /// Set the display name for a speaker label
    Speaker {
        id: String,
        /// Speaker label: A or B
        label: String,
        name: String,
    },
    /// Delete a recording from the archive
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Copy a recording's transcript to the clipboard
    Copy { id: String },
    /// Fetch completed transcripts from the AssemblyAI account that are
    /// missing locally
    Pull {
        /// Only fetch transcripts created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Only fetch transcripts created on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Back up the archive to the Pantry cloud basket
    Push,
    /// Download the cloud basket and merge it into the archive
    Sync,
    /// Export the archive to a JSON file
    Export { path: PathBuf },
    /// Import recordings from a JSON file into the archive
    Import { path: PathBuf },
    /// Show or update configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    lasto_core::set_verbose(cli.verbose);

    match cli.command {
        Command::Transcribe { file } => commands::transcribe::transcribe_file(&file).await,
        Command::Record => commands::transcribe::record().await,
        Command::List => commands::archive::list(),
        Command::Show { id } => commands::archive::show(&id),
        Command::Rename { id, title } => commands::archive::rename(&id, &title),
        Command::Speaker { id, label, name } => commands::archive::speaker(&id, &label, &name),
        Command::Delete { id, yes } => commands::archive::delete(&id, yes),
        Command::Copy { id } => commands::archive::copy(&id),
        Command::Pull { from, to } => commands::sync::pull(from, to).await,
        Command::Push => commands::sync::push().await,
        Command::Sync => commands::sync::sync_down().await,
        Command::Export { path } => commands::sync::export(&path),
        Command::Import { path } => commands::sync::import(&path),
        Command::Config(args) => commands::config::run(args),
    }
}
