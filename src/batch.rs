//! # Batch Conversion
//!
//! Walks a songs directory laid out as one sub-directory per song, each holding one
//! chart file per difficulty:
//!
//! ```text
//! songs/
//!   Magnolia/
//!     magnolia.easy.json
//!     magnolia.normal.json
//!     magnolia.hard.json
//!   Wings of Piano/
//!     ...
//! ```
//!
//! ## Modes
//! - [`check_songs`] - Dry run: extract, compare and test-encode every variant
//! - [`extract_songs`] - Write MIDI files according to [`select_outputs`]
//! - [`convert_file`] - Convert a single chart
//!
//! Songs are processed in parallel; reports list songs in file-name order regardless.
//! A failing song is reported and skipped, it never aborts the batch.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compare::{compare_variants, percent, Comparison};
use crate::error::DeemoError;
use crate::extract::{extract, CanonicalNote};
use crate::midi::notes_to_midi;
use crate::record::{parse_song, SongRecord};
use crate::select::{select_outputs, Selection};

/// File extensions that hold chart JSON.
pub const SONG_EXTENSIONS: &[&str] = &["json", "txt"];

/// Songs with fewer variants than this cannot be cross-checked.
pub const MIN_VARIANTS: usize = 2;

/// Options for [`check_songs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Leave length mismatches out of the messages (they are still counted)
    pub suppress_length: bool,
    /// Leave notes mismatches out of the messages (they are still counted)
    pub suppress_notes: bool,
}

/// Options for [`extract_songs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Write only the longest variant even when variants disagree
    pub one_only: bool,
}

/// One song directory and its chart files, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDir {
    pub name: String,
    pub path: PathBuf,
    pub variants: Vec<PathBuf>,
}

/// Outcome of [`check_songs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub songs_total: usize,
    pub length_mismatch: Vec<String>,
    pub notes_mismatch: Vec<String>,
    pub messages: Vec<String>,
}

impl CheckReport {
    /// Closing lines printed after the per-song messages.
    pub fn summary(&self) -> Vec<String> {
        vec![
            "Comparison done.".to_string(),
            format!(
                "{}/{} ({:.2}%) songs have difficulties with different lengths.",
                self.length_mismatch.len(),
                self.songs_total,
                percent(self.length_mismatch.len(), self.songs_total)
            ),
            format!(
                "{}/{} ({:.2}%) songs have difficulties with different notes.",
                self.notes_mismatch.len(),
                self.songs_total,
                percent(self.notes_mismatch.len(), self.songs_total)
            ),
        ]
    }
}

/// Outcome of [`extract_songs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractReport {
    pub songs_total: usize,
    pub written: Vec<PathBuf>,
    pub messages: Vec<String>,
}

/// Whether a path looks like a chart file.
pub fn is_song_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SONG_EXTENSIONS.contains(&ext))
}

/// Read and parse one chart file.
pub fn load_song(path: &Path) -> Result<SongRecord, DeemoError> {
    let text = fs::read_to_string(path).map_err(|e| DeemoError::io(path, e))?;
    parse_song(&text)
}

/// List the song directories directly under `songs_dir` with their chart files.
pub fn list_songs(songs_dir: &Path) -> Result<Vec<SongDir>, DeemoError> {
    let mut songs = Vec::new();

    for entry in WalkDir::new(songs_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(songs_dir, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let variants = WalkDir::new(entry.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_song_file(e.path()))
            .map(|e| e.into_path())
            .collect();

        songs.push(SongDir {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
            variants,
        });
    }

    Ok(songs)
}

fn walk_error(root: &Path, e: walkdir::Error) -> DeemoError {
    let path = e.path().unwrap_or(root).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
    DeemoError::io(path, source)
}

/// Load and extract every variant of a song, then compare them pairwise.
pub fn compare_song(song: &SongDir) -> Result<(Comparison, Vec<Vec<CanonicalNote>>), DeemoError> {
    let variants = song
        .variants
        .iter()
        .map(|path| load_song(path).and_then(|record| extract(&record)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((compare_variants(&variants), variants))
}

/// Per-song result of a check run.
#[derive(Debug, Clone, PartialEq)]
enum SongCheck {
    TooFewVariants,
    ReadError(String),
    Compared {
        verdict: Comparison,
        conversion_error: Option<String>,
    },
}

fn check_song(song: &SongDir) -> SongCheck {
    debug!(song = %song.name, variants = song.variants.len(), "checking song");

    if song.variants.len() < MIN_VARIANTS {
        return SongCheck::TooFewVariants;
    }

    let (verdict, variants) = match compare_song(song) {
        Ok(compared) => compared,
        Err(e) => {
            warn!(song = %song.name, error = %e, "failed to read song");
            return SongCheck::ReadError(e.to_string());
        }
    };

    let conversion_error = variants
        .iter()
        .find_map(|notes| notes_to_midi(notes).err())
        .map(|e| e.to_string());

    SongCheck::Compared {
        verdict,
        conversion_error,
    }
}

/// Dry run over a songs directory: extract, compare and test-encode every song.
///
/// Only an unreadable `songs_dir` is an error; per-song problems end up in
/// [`CheckReport::messages`].
pub fn check_songs(songs_dir: &Path, options: &CheckOptions) -> Result<CheckReport, DeemoError> {
    let songs = list_songs(songs_dir)?;
    let results: Vec<SongCheck> = songs.par_iter().map(check_song).collect();

    let mut report = CheckReport {
        songs_total: songs.len(),
        ..CheckReport::default()
    };

    for (song, result) in songs.iter().zip(results) {
        match result {
            SongCheck::TooFewVariants => report
                .messages
                .push(format!("{} has less than {} difficulties.", song.name, MIN_VARIANTS)),
            SongCheck::ReadError(e) => report.messages.push(format!("{} Read error: {}", song.name, e)),
            SongCheck::Compared {
                verdict,
                conversion_error,
            } => {
                match verdict {
                    Comparison::Equal => {}
                    Comparison::LengthMismatch { .. } => {
                        if !options.suppress_length {
                            report.messages.push(format!("{} {}", song.name, verdict));
                        }
                        report.length_mismatch.push(song.name.clone());
                    }
                    Comparison::NotesMismatch { .. } => {
                        if !options.suppress_notes {
                            report.messages.push(format!("{} {}", song.name, verdict));
                        }
                        report.notes_mismatch.push(song.name.clone());
                    }
                }
                if let Some(e) = conversion_error {
                    report.messages.push(format!("{} Conversion error: {}", song.name, e));
                }
            }
        }
    }

    Ok(report)
}

fn extract_song(
    song: &SongDir,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<Vec<PathBuf>, String> {
    debug!(song = %song.name, variants = song.variants.len(), "extracting song");

    if song.variants.len() < MIN_VARIANTS {
        return Err(format!(
            "Skipping {} because it has less than {} difficulties.",
            song.name, MIN_VARIANTS
        ));
    }

    let converting = |e: DeemoError| format!("Error converting {}: {}", song.name, e);

    let (verdict, variants) = compare_song(song).map_err(converting)?;

    let targets: Vec<(usize, PathBuf)> = match select_outputs(&variants, verdict, options.one_only) {
        None => Vec::new(),
        Some(Selection::Single(index)) => {
            vec![(index, output_dir.join(format!("{}.mid", song.name)))]
        }
        Some(Selection::All(indices)) => indices
            .into_iter()
            .map(|index| (index, output_dir.join(format!("{}.mid", variant_stem(&song.variants[index])))))
            .collect(),
    };

    let mut written = Vec::with_capacity(targets.len());
    for (index, target) in targets {
        let bytes = notes_to_midi(&variants[index]).map_err(converting)?;
        fs::write(&target, bytes).map_err(|e| converting(DeemoError::io(&target, e)))?;
        written.push(target);
    }

    Ok(written)
}

fn variant_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert every song under `songs_dir` into MIDI files in `output_dir`.
///
/// `output_dir` is created if needed.
pub fn extract_songs(
    songs_dir: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport, DeemoError> {
    fs::create_dir_all(output_dir).map_err(|e| DeemoError::io(output_dir, e))?;
    let songs = list_songs(songs_dir)?;

    let results: Vec<Result<Vec<PathBuf>, String>> = songs
        .par_iter()
        .map(|song| extract_song(song, output_dir, options))
        .collect();

    let mut report = ExtractReport {
        songs_total: songs.len(),
        ..ExtractReport::default()
    };
    for result in results {
        match result {
            Ok(paths) => report.written.extend(paths),
            Err(message) => {
                warn!("{}", message);
                report.messages.push(message);
            }
        }
    }

    Ok(report)
}

/// Convert one chart file to one MIDI file, returning the extracted notes.
pub fn convert_file(input: &Path, output: &Path) -> Result<Vec<CanonicalNote>, DeemoError> {
    let notes = extract(&load_song(input)?)?;
    let bytes = notes_to_midi(&notes)?;
    fs::write(output, bytes).map_err(|e| DeemoError::io(output, e))?;
    Ok(notes)
}
