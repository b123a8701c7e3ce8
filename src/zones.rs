use crate::dump_snapshot::AtomRecord;
use crate::error::ConfigError;

pub const DEFAULT_Z_MIN: f64 = -4.0;
pub const DEFAULT_Z_MAX: f64 = 41.8;
pub const DEFAULT_CO2_TYPE: usize = 3;
pub const DEFAULT_N2_TYPE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Inside,
    TopReservoir,
    BottomReservoir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Co2,
    N2,
}

/// The inside band `[z_min, z_max]` along z; the reservoirs lie beyond it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBounds {
    z_min: f64,
    z_max: f64,
}

impl ZoneBounds {
    pub fn new(z_min: f64, z_max: f64) -> Result<Self, ConfigError> {
        if !z_min.is_finite() || !z_max.is_finite() || z_min > z_max {
            return Err(ConfigError::InvalidBounds { z_min, z_max });
        }
        Ok(Self { z_min, z_max })
    }

    #[inline]
    pub fn z_min(&self) -> f64 {
        self.z_min
    }

    #[inline]
    pub fn z_max(&self) -> f64 {
        self.z_max
    }

    /// Both bounds belong to the inside zone. NaN falls in no zone.
    pub fn zone_of(&self, z: f64) -> Option<Zone> {
        if (self.z_min..=self.z_max).contains(&z) {
            Some(Zone::Inside)
        } else if z < self.z_min {
            Some(Zone::BottomReservoir)
        } else if z > self.z_max {
            Some(Zone::TopReservoir)
        } else {
            None
        }
    }
}

impl Default for ZoneBounds {
    fn default() -> Self {
        Self {
            z_min: DEFAULT_Z_MIN,
            z_max: DEFAULT_Z_MAX,
        }
    }
}

/// Atom type codes of the tracked species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesFilter {
    pub co2: usize,
    pub n2: usize,
}

impl SpeciesFilter {
    pub fn species_of(&self, atom_type: usize) -> Option<Species> {
        if atom_type == self.co2 {
            Some(Species::Co2)
        } else if atom_type == self.n2 {
            Some(Species::N2)
        } else {
            None
        }
    }
}

impl Default for SpeciesFilter {
    fn default() -> Self {
        Self {
            co2: DEFAULT_CO2_TYPE,
            n2: DEFAULT_N2_TYPE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    pub bounds: ZoneBounds,
    pub species: SpeciesFilter,
}

impl Classifier {
    pub fn new(bounds: ZoneBounds, species: SpeciesFilter) -> Self {
        Self { bounds, species }
    }

    /// `None` for untracked species and for atoms outside every zone.
    pub fn classify(&self, atom: &AtomRecord) -> Option<(Species, Zone)> {
        let species = self.species.species_of(atom.atom_type)?;
        let zone = self.bounds.zone_of(atom.z)?;
        Some((species, zone))
    }
}
