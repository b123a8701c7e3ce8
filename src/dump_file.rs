use regex::Regex;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::dump_snapshot::DumpSnapshot;
use crate::error::DumpParsingError;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// Reads a single-frame dump file.
///
/// Only I/O problems are errors here; malformed content is reported inside
/// the returned snapshot. Invalid UTF-8 is replaced, so a corrupted line is
/// rejected on its own instead of the whole file.
pub fn read_snapshot(path: &Path) -> Result<DumpSnapshot, DumpParsingError> {
    let bytes = fs::read(path).map_err(|source| DumpParsingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(DumpSnapshot::parse(&path.to_string_lossy(), &text))
}

/// First run of ASCII digits in `name`, e.g. `gasmotion.2500` -> 2500.
///
/// `None` when there are no digits, and also when the digits do not fit in
/// `u64`: such a name is deliberately ordered like an unnumbered one, after
/// every numbered name, instead of by its numeric value. See
/// [`cmp_timestep_keys`].
#[must_use]
pub fn timestep_key(name: &str) -> Option<u64> {
    DIGITS.find(name).and_then(|m| m.as_str().parse().ok())
}

/// Orders keys ascending with `None` last.
#[must_use]
pub fn cmp_timestep_keys(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
