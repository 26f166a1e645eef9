//! Deemo chart to MIDI converter
//!
//! **Usage:**
//! ```bash
//! deemo-midi single <SONG> <OUTPUT> [--notes-json <FILE>]
//! deemo-midi check <SONGS_DIR> [--suppress-length] [--suppress-notes]
//! deemo-midi extract <SONGS_DIR> <OUTPUT_DIR> [--one-only]
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use deemo_midi::batch::{check_songs, convert_file, extract_songs, CheckOptions, ExtractOptions};
use deemo_midi::notes_to_json;

/// Extract Deemo songs to MIDI files
#[derive(Parser, Debug)]
#[command(name = "deemo-midi", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a single Deemo chart to a MIDI file
    Single {
        song: PathBuf,
        output: PathBuf,
        /// Also write the extracted notes as JSON
        #[arg(long, value_name = "FILE")]
        notes_json: Option<PathBuf>,
    },

    /// Dry run: check that every song can be extracted and its difficulties agree
    Check {
        songs_dir: PathBuf,
        /// Suppress the length mismatch messages
        #[arg(long, env = "DEEMO_SUPPRESS_LENGTH")]
        suppress_length: bool,
        /// Suppress the notes mismatch messages
        #[arg(long, env = "DEEMO_SUPPRESS_NOTES")]
        suppress_notes: bool,
    },

    /// Extract every song in a directory to MIDI files
    Extract {
        songs_dir: PathBuf,
        output_dir: PathBuf,
        /// Write only the difficulty with the most notes, even if difficulties disagree
        #[arg(long)]
        one_only: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Single {
            song,
            output,
            notes_json,
        } => {
            let notes = convert_file(&song, &output)
                .with_context(|| format!("Failed to convert {}", song.display()))?;
            info!("Wrote {} notes to {}", notes.len(), output.display());

            if let Some(path) = notes_json {
                fs::write(&path, notes_to_json(&notes)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        Command::Check {
            songs_dir,
            suppress_length,
            suppress_notes,
        } => {
            let options = CheckOptions {
                suppress_length,
                suppress_notes,
            };
            info!("Checking songs in {}", songs_dir.display());
            let report = check_songs(&songs_dir, &options)
                .with_context(|| format!("Failed to read {}", songs_dir.display()))?;

            for line in report.messages.iter().chain(&report.summary()) {
                println!("{}", line);
            }
        }
        Command::Extract {
            songs_dir,
            output_dir,
            one_only,
        } => {
            let options = ExtractOptions { one_only };
            info!(
                "Extracting songs in {} to {}",
                songs_dir.display(),
                output_dir.display()
            );
            let report = extract_songs(&songs_dir, &output_dir, &options)
                .with_context(|| format!("Failed to extract {}", songs_dir.display()))?;
            info!(
                "Wrote {} MIDI files for {} songs",
                report.written.len(),
                report.songs_total
            );
        }
    }

    Ok(())
}
