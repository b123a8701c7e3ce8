use itertools::Itertools;
use log::{debug, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::dump_file::{cmp_timestep_keys, read_snapshot, timestep_key};
use crate::dump_snapshot::AtomRecord;
use crate::error::ConfigError;
use crate::zones::{Classifier, Species, Zone};

pub const TABLE_HEADER: [&str; 7] = [
    "Step",
    "CO2 Inside Count",
    "N2 Inside Count",
    "CO2 Topres Count",
    "N2 Topres Count",
    "CO2 Botres Count",
    "N2 Botres Count",
];

/// Species x zone counts of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountRow {
    pub step: u64,
    pub co2_inside: usize,
    pub n2_inside: usize,
    pub co2_top: usize,
    pub n2_top: usize,
    pub co2_bottom: usize,
    pub n2_bottom: usize,
}

impl CountRow {
    pub fn new(step: u64) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    pub fn from_atoms(step: u64, atoms: &[AtomRecord], classifier: &Classifier) -> Self {
        atoms
            .iter()
            .filter_map(|atom| classifier.classify(atom))
            .fold(Self::new(step), |mut row, (species, zone)| {
                row.tally(species, zone);
                row
            })
    }

    pub fn tally(&mut self, species: Species, zone: Zone) {
        let count = match (species, zone) {
            (Species::Co2, Zone::Inside) => &mut self.co2_inside,
            (Species::N2, Zone::Inside) => &mut self.n2_inside,
            (Species::Co2, Zone::TopReservoir) => &mut self.co2_top,
            (Species::N2, Zone::TopReservoir) => &mut self.n2_top,
            (Species::Co2, Zone::BottomReservoir) => &mut self.co2_bottom,
            (Species::N2, Zone::BottomReservoir) => &mut self.n2_bottom,
        };
        *count += 1;
    }

    fn fields(&self) -> [String; 7] {
        [
            self.step.to_string(),
            self.co2_inside.to_string(),
            self.n2_inside.to_string(),
            self.co2_top.to_string(),
            self.n2_top.to_string(),
            self.co2_bottom.to_string(),
            self.n2_bottom.to_string(),
        ]
    }
}

/// Rows ordered by step. Equal steps keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<CountRow>,
}

impl ResultTable {
    pub fn new(mut rows: Vec<CountRow>) -> Self {
        rows.sort_by_key(|row| row.step);
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", TABLE_HEADER.join(","))?;
        for row in &self.rows {
            writeln!(w, "{}", row.fields().iter().join(","))?;
        }
        Ok(())
    }

    /// Writes the table as CSV, replacing whatever is at `path`.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let f = fs::File::create(path)?;
        let mut w = io::BufWriter::new(f);
        self.write(&mut w)?;
        w.flush()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Orders snapshot files by the number in their name, unnumbered ones last.
/// Ties fall back to the file name.
#[must_use]
pub fn sort_by_timestep(files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|path| (timestep_key(&file_name(path)), file_name(path), path))
        .sorted_by(|a, b| cmp_timestep_keys(a.0, b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, path)| path.clone())
        .collect()
}

/// Keeps items at positions `0, stride, 2 * stride, ...`.
pub fn select_stride<T>(items: Vec<T>, stride: usize) -> Result<Vec<T>, ConfigError> {
    if stride == 0 {
        return Err(ConfigError::InvalidStride(stride));
    }
    Ok(items.into_iter().step_by(stride).collect())
}

fn count_file(path: &Path, classifier: &Classifier) -> Option<CountRow> {
    let snapshot = match read_snapshot(path) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("Skipping file {}: {err}", path.display());
            return None;
        }
    };
    let Some(step) = snapshot.step else {
        warn!("Skipping file {} due to missing TIMESTEP", path.display());
        return None;
    };
    if snapshot.atoms.is_empty() {
        warn!("Skipping file {} due to missing atoms", path.display());
        return None;
    }
    debug!(
        "{}: step {step}, {} atoms",
        path.display(),
        snapshot.atoms_count()
    );
    Some(CountRow::from_atoms(step, &snapshot.atoms, classifier))
}

/// Counts tracked species per zone for every `stride`-th snapshot file.
///
/// Unreadable files and snapshots without a step or atoms are skipped, so
/// the table may come back empty.
pub fn aggregate(
    files: &[PathBuf],
    stride: usize,
    classifier: &Classifier,
) -> Result<ResultTable, ConfigError> {
    let selected = select_stride(sort_by_timestep(files), stride)?;
    debug!(
        "Selected {} of {} files with stride {stride}",
        selected.len(),
        files.len()
    );
    let rows = selected
        .iter()
        .filter_map(|path| count_file(path, classifier))
        .collect();
    Ok(ResultTable::new(rows))
}
