use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single atom line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomLineError {
    #[error("expected at least 7 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("field {index} is not a valid {expected}: {field:?}")]
    InvalidField {
        index: usize,
        expected: &'static str,
        field: String,
    },
}

#[derive(Debug, Error)]
pub enum DumpParsingError {
    #[error("Failed to read {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("stride must be a positive integer, got {0}")]
    InvalidStride(usize),

    #[error("invalid zone bounds: z_min = {z_min}, z_max = {z_max}")]
    InvalidBounds { z_min: f64, z_max: f64 },
}

/// Why a run directory produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no matching snapshot files")]
    NoMatchingFiles,

    #[error("no valid data extracted")]
    NoValidData,
}
