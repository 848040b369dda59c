//! Batch conversion of every matching image in a directory.
//!
//! The directory is scanned one level deep (no recursion), matching files
//! are converted in parallel, and every file gets a [`FileReport`]. A failed
//! file is counted and reported; it never stops the rest of the batch.
//!
//! Inputs that would write the same `.ico` (`a.png` and `a.PNG`, or
//! `logo.png` and `logo.jpg`) are not raced against each other: the first in
//! scan order is converted, the rest fail with kind `collision`.
//!
//! ## Exit codes
//!
//! | Outcome | Code |
//! |---|---|
//! | every file converted | 0 |
//! | some converted, some failed | 2 |
//! | nothing converted, or no inputs found | 1 |

use crate::config::IcoConfig;
use crate::convert::{ConversionStage, convert_file_with_backend, icon_path_for};
use crate::imaging::{ImageBackend, RustBackend, has_extension};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] walkdir::Error),
}

/// Outcome of converting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Converted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Converted {
        bytes: u64,
        sizes: Vec<u32>,
    },
    Failed {
        /// `decode`, `encode`, `io`, `extension`, or `collision`.
        kind: String,
        stage: ConversionStage,
        error: String,
    },
}

/// Aggregate counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let succeeded = reports.iter().filter(|r| r.is_success()).count();
        Self {
            total: reports.len(),
            succeeded,
            failed: reports.len() - succeeded,
        }
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.total == 0 || self.succeeded == 0 {
            1
        } else if self.succeeded == self.total {
            0
        } else {
            2
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
}

/// List the files directly inside `dir` whose extension is in `extensions`.
///
/// Sorted by file name so reports come out in a stable order.
pub fn find_inputs(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, BatchError> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

/// Convert one file to `<stem>.ico` next to it.
///
/// Files whose extension is not in `config.input.extensions` are refused
/// without being read.
pub fn convert_one(config: &IcoConfig, input: &Path) -> FileReport {
    convert_one_with_backend(&RustBackend::new(), config, input)
}

/// [`convert_one`] with a specific backend.
pub fn convert_one_with_backend(
    backend: &impl ImageBackend,
    config: &IcoConfig,
    input: &Path,
) -> FileReport {
    let output = icon_path_for(input);
    if !has_extension(input, &config.input.extensions) {
        return FileReport {
            input: input.to_path_buf(),
            output,
            status: FileStatus::Failed {
                kind: "extension".to_string(),
                stage: ConversionStage::Idle,
                error: format!(
                    "input must be one of: {}",
                    config.input.extensions.join(", ")
                ),
            },
        };
    }

    let status = match convert_file_with_backend(backend, input, &output, &config.icon.sizes) {
        Ok(done) => FileStatus::Converted {
            bytes: done.bytes,
            sizes: done.sizes,
        },
        Err(e) => {
            log::warn!("{}: {e}", input.display());
            FileStatus::Failed {
                kind: e.kind().to_string(),
                stage: e.stage(),
                error: e.to_string(),
            }
        }
    };
    FileReport {
        input: input.to_path_buf(),
        output,
        status,
    }
}

/// Pair each input with the earlier input that already claims its output.
///
/// `inputs` must be in scan order; the first claimant of an output wins.
/// Outputs are compared ignoring case, as Windows and macOS resolve them.
fn claim_outputs(inputs: &[PathBuf]) -> Vec<(&Path, Option<&Path>)> {
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let key = icon_path_for(input).to_string_lossy().to_lowercase();
            let owner = *claimed.entry(key).or_insert(input);
            let taken = (owner != input.as_path()).then_some(owner);
            (input.as_path(), taken)
        })
        .collect()
}

fn collision_report(input: &Path, owner: &Path) -> FileReport {
    let output = icon_path_for(input);
    log::warn!(
        "{}: {} is already written by {}",
        input.display(),
        output.display(),
        owner.display()
    );
    FileReport {
        input: input.to_path_buf(),
        status: FileStatus::Failed {
            kind: "collision".to_string(),
            stage: ConversionStage::Idle,
            error: format!(
                "{} is already produced from {}",
                output.display(),
                owner.display()
            ),
        },
        output,
    }
}

/// Convert every matching file in `dir`.
///
/// When `events` is given, each [`FileReport`] is also sent there as soon as
/// its file finishes, for live progress output.
pub fn run_batch(
    dir: &Path,
    config: &IcoConfig,
    events: Option<Sender<FileReport>>,
) -> Result<BatchReport, BatchError> {
    run_batch_with_backend(&RustBackend::new(), dir, config, events)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_batch_with_backend(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &IcoConfig,
    events: Option<Sender<FileReport>>,
) -> Result<BatchReport, BatchError> {
    let inputs = find_inputs(dir, &config.input.extensions)?;
    log::info!("{} input(s) in {}", inputs.len(), dir.display());

    let files: Vec<FileReport> = claim_outputs(&inputs)
        .into_par_iter()
        .map(|(input, taken)| {
            let report = match taken {
                Some(owner) => collision_report(input, owner),
                None => convert_one_with_backend(backend, config, input),
            };
            if let Some(tx) = &events {
                // Receiver gone means nobody is printing; keep converting.
                tx.send(report.clone()).ok();
            }
            report
        })
        .collect();

    let summary = BatchSummary::from_reports(&files);
    Ok(BatchReport {
        directory: dir.to_path_buf(),
        files,
        summary,
    })
}
