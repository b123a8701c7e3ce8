use log::warn;
use std::str::FromStr;

use crate::error::AtomLineError;

const HEADER_ITEM: &str = "ITEM:";
const SECTION_TIMESTEP: &str = "TIMESTEP";
const SECTION_NUM_OF_ATOMS: &str = "NUMBER OF ATOMS";
const SECTION_BOX: &str = "BOX BOUNDS";
const SECTION_ATOMS: &str = "ATOMS";
const BOX_BOUNDS_LINES: usize = 3;
const ATOM_FIELDS: usize = 7;

/// One row of an `ITEM: ATOMS id mol type q x y z` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomRecord {
    pub id: usize,
    pub mol: usize,
    pub atom_type: usize,
    pub charge: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

fn parse_field<T: FromStr>(
    fields: &[&str],
    index: usize,
    expected: &'static str,
) -> Result<T, AtomLineError> {
    fields[index]
        .parse::<T>()
        .map_err(|_| AtomLineError::InvalidField {
            index,
            expected,
            field: fields[index].to_string(),
        })
}

impl FromStr for AtomRecord {
    type Err = AtomLineError;

    /// Fields are positional; anything past the seventh is ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() < ATOM_FIELDS {
            return Err(AtomLineError::TooFewFields {
                found: fields.len(),
            });
        }
        Ok(Self {
            id: parse_field(&fields, 0, "integer")?,
            mol: parse_field(&fields, 1, "integer")?,
            atom_type: parse_field(&fields, 2, "integer")?,
            charge: parse_field(&fields, 3, "float")?,
            x: parse_field(&fields, 4, "float")?,
            y: parse_field(&fields, 5, "float")?,
            z: parse_field(&fields, 6, "float")?,
        })
    }
}

/// An atom line that was skipped while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedLine {
    /// 1-based line number in the source file.
    pub line_no: usize,
    pub text: String,
    pub error: AtomLineError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Timestep,
    NumberOfAtoms,
    BoxBounds,
    Atoms,
    Other,
}

impl Section {
    fn from_header(line: &str) -> Self {
        let name = line
            .trim_start()
            .strip_prefix(HEADER_ITEM)
            .unwrap_or_default()
            .trim_start();
        if name.starts_with(SECTION_TIMESTEP) {
            Self::Timestep
        } else if name.starts_with(SECTION_NUM_OF_ATOMS) {
            Self::NumberOfAtoms
        } else if name.starts_with(SECTION_BOX) {
            Self::BoxBounds
        } else if name.starts_with(SECTION_ATOMS) {
            Self::Atoms
        } else {
            Self::Other
        }
    }
}

/// Next line that is not blank, with its 0-based index.
fn next_filled<'a, I>(lines: &mut I) -> Option<(usize, &'a str)>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    lines.find(|(_, l)| !l.trim().is_empty())
}

/// A single dump frame.
///
/// `step` stays `None` when the frame has no usable `ITEM: TIMESTEP`
/// section. Such a snapshot is still returned so the caller decides what to
/// do with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DumpSnapshot {
    pub step: Option<u64>,
    pub atoms: Vec<AtomRecord>,
    pub malformed: Vec<MalformedLine>,
    /// Value of `ITEM: NUMBER OF ATOMS`, when present.
    pub declared_atoms: Option<usize>,
}

impl DumpSnapshot {
    /// Parses the text of one dump frame. `name` is only used in log messages.
    pub fn parse(name: &str, text: &str) -> Self {
        let mut snapshot = Self::default();
        let mut in_atoms = false;
        let mut lines = text.lines().enumerate();
        while let Some((i, line)) = lines.next() {
            let Some(first) = line.split_whitespace().next() else {
                continue;
            };
            if first == HEADER_ITEM {
                in_atoms = false;
                match Section::from_header(line) {
                    Section::Timestep => snapshot.read_step(name, next_filled(&mut lines)),
                    Section::NumberOfAtoms => {
                        snapshot.read_atoms_count(name, next_filled(&mut lines))
                    }
                    Section::BoxBounds => lines
                        .by_ref()
                        .filter(|(_, l)| !l.trim().is_empty())
                        .take(BOX_BOUNDS_LINES)
                        .for_each(drop),
                    Section::Atoms => in_atoms = true,
                    Section::Other => {}
                }
            } else if in_atoms {
                match line.parse::<AtomRecord>() {
                    Ok(atom) => snapshot.atoms.push(atom),
                    Err(error) => {
                        warn!(
                            "Skipping malformed atom line {} in {name}: {error}: {}",
                            i + 1,
                            line.trim()
                        );
                        snapshot.malformed.push(MalformedLine {
                            line_no: i + 1,
                            text: line.trim().to_string(),
                            error,
                        });
                    }
                }
            }
        }
        if let Some(declared) = snapshot.declared_atoms {
            if declared != snapshot.atoms.len() {
                warn!(
                    "{name} declares {declared} atoms, {} were parsed",
                    snapshot.atoms.len()
                );
            }
        }
        if snapshot.step.is_none() {
            warn!("No TIMESTEP found in {name}");
        }
        snapshot
    }

    fn read_step(&mut self, name: &str, line: Option<(usize, &str)>) {
        match line.map(|(i, l)| (i, l.trim().parse::<u64>())) {
            Some((_, Ok(step))) => {
                if let Some(prev) = self.step.replace(step) {
                    warn!("{name} has more than one TIMESTEP, {prev} replaced by {step}");
                }
            }
            Some((i, Err(_))) => warn!("Invalid TIMESTEP value on line {} in {name}", i + 1),
            None => warn!("TIMESTEP header without a value at the end of {name}"),
        }
    }

    fn read_atoms_count(&mut self, name: &str, line: Option<(usize, &str)>) {
        match line.map(|(i, l)| (i, l.trim().parse::<usize>())) {
            Some((_, Ok(n))) => self.declared_atoms = Some(n),
            Some((i, Err(_))) => warn!("Invalid NUMBER OF ATOMS on line {} in {name}", i + 1),
            None => warn!("NUMBER OF ATOMS header without a value at the end of {name}"),
        }
    }

    #[inline]
    #[must_use]
    pub fn atoms_count(&self) -> usize {
        self.atoms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_f64_near;

    const DUMP: &str = "\
ITEM: TIMESTEP
1500
ITEM: NUMBER OF ATOMS
3
ITEM: BOX BOUNDS pp pp pp
0.0 30.0
0.0 30.0
-60.0 100.0
ITEM: ATOMS id mol type q x y z
1 1 3 0.70 1.0 2.0 0.0
2 1 5 -0.35 4.5 5.5 50.0

3 2 1 0.0 7.0 8.0 -10.25
";

    #[test]
    fn test_parse_full_frame() {
        let snapshot = DumpSnapshot::parse("dump", DUMP);
        assert_eq!(snapshot.step, Some(1500));
        assert_eq!(snapshot.declared_atoms, Some(3));
        assert_eq!(snapshot.atoms_count(), 3);
        assert!(snapshot.malformed.is_empty());
        let atom = snapshot.atoms[2];
        assert_eq!((atom.id, atom.mol, atom.atom_type), (3, 2, 1));
        assert_f64_near!(atom.charge, 0.0);
        assert_f64_near!(atom.z, -10.25);
        assert_eq!(snapshot.atoms[1].atom_type, 5);
        assert_f64_near!(snapshot.atoms[1].charge, -0.35);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(
            DumpSnapshot::parse("dump", DUMP),
            DumpSnapshot::parse("dump", DUMP)
        );
    }

    #[test]
    fn test_short_atom_line_is_skipped() {
        let text = "\
ITEM: TIMESTEP
10
ITEM: ATOMS id mol type q x y z
1 1 3 0.0 1.0 1.0 1.0
2 1 5 0.0
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(snapshot.atoms_count(), 1);
        assert_eq!(snapshot.malformed.len(), 1);
        let malformed = &snapshot.malformed[0];
        assert_eq!(malformed.line_no, 5);
        assert_eq!(malformed.text, "2 1 5 0.0");
        assert_eq!(malformed.error, AtomLineError::TooFewFields { found: 4 });
    }

    #[test]
    fn test_non_numeric_atom_line_is_skipped() {
        let text = "\
ITEM: TIMESTEP
10
ITEM: ATOMS id mol type q x y z
1 1 3.5 0.0 1.0 1.0 1.0
2 1 5 0.0 1.0 1.0 abc
3 1 5 0.0 1.0 1.0 2.0
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(snapshot.atoms_count(), 1);
        assert_eq!(snapshot.atoms[0].id, 3);
        let errors = snapshot
            .malformed
            .iter()
            .map(|m| m.error.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            errors,
            vec![
                AtomLineError::InvalidField {
                    index: 2,
                    expected: "integer",
                    field: "3.5".to_string(),
                },
                AtomLineError::InvalidField {
                    index: 6,
                    expected: "float",
                    field: "abc".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let atom = "7 2 3 0.5 1.0 2.0 3.0 0.1 0.2 0.3"
            .parse::<AtomRecord>()
            .unwrap();
        assert_eq!(atom.id, 7);
        assert_f64_near!(atom.z, 3.0);
    }

    #[test]
    fn test_missing_timestep() {
        let text = "\
ITEM: ATOMS id mol type q x y z
1 1 3 0.0 1.0 1.0 1.0
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(snapshot.step, None);
        assert_eq!(snapshot.atoms_count(), 1);
    }

    #[test]
    fn test_invalid_timestep_value() {
        let text = "ITEM: TIMESTEP\nabc\nITEM: ATOMS id mol type q x y z\n1 1 3 0 0 0 0\n";
        assert_eq!(DumpSnapshot::parse("dump", text).step, None);
        assert_eq!(DumpSnapshot::parse("dump", "ITEM: TIMESTEP\n").step, None);
    }

    #[test]
    fn test_box_bounds_are_not_atoms() {
        // box lines look like atom lines when they carry tilt factors
        let text = "\
ITEM: TIMESTEP
0
ITEM: ATOMS id mol type q x y z
1 1 3 0.0 1.0 1.0 1.0
ITEM: BOX BOUNDS xy xz yz pp pp pp
0 1 0 1 2 3 4
0 1 0 1 2 3 4
0 1 0 1 2 3 4
ITEM: ATOMS id mol type q x y z
2 1 5 0.0 1.0 1.0 1.0
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(
            snapshot.atoms.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(snapshot.malformed.is_empty());
    }

    #[test]
    fn test_unknown_section_ends_atoms() {
        let text = "\
ITEM: TIMESTEP
0
ITEM: ATOMS id mol type q x y z
1 1 3 0.0 1.0 1.0 1.0
ITEM: BONDS
1 1 1 2 0 0 0
random trailing text
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(snapshot.atoms_count(), 1);
        assert!(snapshot.malformed.is_empty());
    }

    #[test]
    fn test_number_of_atoms_is_not_an_atom_section() {
        let text = "ITEM: NUMBER OF ATOMS\n2\nITEM: TIMESTEP\n4\n";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert!(snapshot.malformed.is_empty());
        assert!(snapshot.atoms.is_empty());
        assert_eq!(snapshot.step, Some(4));
    }

    #[test]
    fn test_blank_lines_before_section_values() {
        let text = "\
ITEM: TIMESTEP

100
ITEM: NUMBER OF ATOMS

2
ITEM: BOX BOUNDS pp pp pp
0.0 30.0

0.0 30.0
-60.0 100.0
ITEM: ATOMS id mol type q x y z
1 1 3 0 0 0 0

2 1 5 0 0 0 45
";
        let snapshot = DumpSnapshot::parse("dump", text);
        assert_eq!(snapshot.step, Some(100));
        assert_eq!(snapshot.declared_atoms, Some(2));
        assert_eq!(snapshot.atoms_count(), 2);
        assert!(snapshot.malformed.is_empty());
    }

    #[test]
    fn test_last_timestep_wins() {
        let text = "ITEM: TIMESTEP\n4\nITEM: TIMESTEP\n8\n";
        assert_eq!(DumpSnapshot::parse("dump", text).step, Some(8));
    }
}
