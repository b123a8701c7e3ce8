mod batch;
mod dump_file;
mod dump_snapshot;
mod error;
mod trajectory;
mod zones;

pub use batch::{
    candidate_dirs, candidate_files, process_dir, run, BatchConfig, BatchReport, DirOutcome,
    DEFAULT_OUTPUT, DEFAULT_PREFIX,
};
pub use dump_file::{cmp_timestep_keys, read_snapshot, timestep_key};
pub use dump_snapshot::{AtomRecord, DumpSnapshot, MalformedLine};
pub use error::{AtomLineError, ConfigError, DumpParsingError, SkipReason};
pub use trajectory::{
    aggregate, select_stride, sort_by_timestep, CountRow, ResultTable, TABLE_HEADER,
};
pub use zones::{
    Classifier, Species, SpeciesFilter, Zone, ZoneBounds, DEFAULT_CO2_TYPE, DEFAULT_N2_TYPE,
    DEFAULT_Z_MAX, DEFAULT_Z_MIN,
};
