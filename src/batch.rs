use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SkipReason};
use crate::trajectory::aggregate;
use crate::zones::Classifier;

pub const DEFAULT_PREFIX: &str = "gasmotion";
pub const DEFAULT_OUTPUT: &str = "molecule_counts.csv";

/// Settings shared read-only by every directory of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub classifier: Classifier,
    /// Snapshot files are the ones whose name starts with this.
    pub prefix: String,
    /// Table file name, written next to the snapshots.
    pub output_name: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            output_name: DEFAULT_OUTPUT.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum DirOutcome {
    Written { path: PathBuf, rows: usize },
    Skipped(SkipReason),
    Failed(anyhow::Error),
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub dirs: BTreeMap<PathBuf, DirOutcome>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, DirOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DirOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DirOutcome::Failed(_)))
    }

    fn count(&self, f: impl Fn(&DirOutcome) -> bool) -> usize {
        self.dirs.values().filter(|o| f(o)).count()
    }
}

fn sub_dirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Every directory below `root`, parents before children, siblings by name.
/// `root` itself is not included and symlinks are not followed.
pub fn candidate_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut stack = sub_dirs(root).context(format!("Reading {}", root.to_string_lossy()))?;
    stack.reverse();
    let mut dirs = Vec::new();
    while let Some(dir) = stack.pop() {
        match sub_dirs(&dir) {
            Ok(children) => stack.extend(children.into_iter().rev()),
            Err(err) => warn!("Not descending into {}: {err}", dir.display()),
        }
        dirs.push(dir);
    }
    Ok(dirs)
}

/// Regular files in `dir` whose name starts with `prefix`.
pub fn candidate_files(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(prefix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn try_process_dir(dir: &Path, stride: usize, config: &BatchConfig) -> Result<DirOutcome> {
    let output = dir.join(&config.output_name);
    let files = candidate_files(dir, &config.prefix)
        .context(format!("Listing {}", dir.to_string_lossy()))?
        .into_iter()
        .filter(|path| *path != output)
        .collect::<Vec<_>>();
    if files.is_empty() {
        info!(
            "No files matching '{}*' found in {}. Skipping...",
            config.prefix,
            dir.display()
        );
        return Ok(DirOutcome::Skipped(SkipReason::NoMatchingFiles));
    }
    let table = aggregate(&files, stride, &config.classifier)?;
    if table.is_empty() {
        warn!("No valid data extracted in {}", dir.display());
        return Ok(DirOutcome::Skipped(SkipReason::NoValidData));
    }
    table
        .save(&output)
        .context(format!("Writing {}", output.to_string_lossy()))?;
    info!("Results saved in {} ({} rows)", output.display(), table.len());
    Ok(DirOutcome::Written {
        path: output,
        rows: table.len(),
    })
}

/// Counts one run directory and writes its table. Never fails: problems end
/// up in the returned outcome.
pub fn process_dir(dir: &Path, stride: usize, config: &BatchConfig) -> DirOutcome {
    info!("Processing folder: {}", dir.display());
    try_process_dir(dir, stride, config).unwrap_or_else(|err| {
        warn!("Failed to process {}: {err:#}", dir.display());
        DirOutcome::Failed(err)
    })
}

/// Processes every directory below `root` in turn.
///
/// Only a zero stride or an unreadable `root` stop the run; everything else
/// is recorded per directory in the report.
pub fn run(root: &Path, stride: usize, config: &BatchConfig) -> Result<BatchReport> {
    if stride == 0 {
        return Err(ConfigError::InvalidStride(stride).into());
    }
    let mut report = BatchReport::default();
    for dir in candidate_dirs(root)? {
        let outcome = process_dir(&dir, stride, config);
        report.dirs.insert(dir, outcome);
    }
    Ok(report)
}
