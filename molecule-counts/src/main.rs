use anyhow::Result;
use clap::Parser;
use lammps_gas_util::{
    run, BatchConfig, Classifier, SpeciesFilter, ZoneBounds, DEFAULT_CO2_TYPE, DEFAULT_N2_TYPE,
    DEFAULT_OUTPUT, DEFAULT_PREFIX, DEFAULT_Z_MAX, DEFAULT_Z_MIN,
};
use log::info;
use std::path::PathBuf;

/// Count CO2 and N2 molecules inside the membrane and in both reservoirs
/// for every run directory below ROOT
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Use every STRIDE-th snapshot
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    stride: u64,

    /// Results directory, every directory below it is processed
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Lower bound of the inside zone (A)
    #[arg(long, default_value_t = DEFAULT_Z_MIN, allow_hyphen_values = true)]
    z_min: f64,

    /// Upper bound of the inside zone (A)
    #[arg(long, default_value_t = DEFAULT_Z_MAX, allow_hyphen_values = true)]
    z_max: f64,

    /// CO2 atom type Id
    #[arg(long, default_value_t = DEFAULT_CO2_TYPE)]
    co2_type: usize,

    /// N2 atom type Id
    #[arg(long, default_value_t = DEFAULT_N2_TYPE)]
    n2_type: usize,

    /// Snapshot file name prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Output table name, written into every processed directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,
}

impl Cli {
    fn config(&self) -> Result<BatchConfig> {
        let bounds = ZoneBounds::new(self.z_min, self.z_max)?;
        let species = SpeciesFilter {
            co2: self.co2_type,
            n2: self.n2_type,
        };
        Ok(BatchConfig {
            classifier: Classifier::new(bounds, species),
            prefix: self.prefix.clone(),
            output_name: self.output.clone(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.config()?;
    let stride = usize::try_from(cli.stride)?;
    let bounds = config.classifier.bounds;
    info!(
        "Counting with stride {stride}, inside zone [{}, {}]",
        bounds.z_min(),
        bounds.z_max()
    );
    let report = run(&cli.root, stride, &config)?;
    info!(
        "Done: {} written, {} skipped, {} failed",
        report.written(),
        report.skipped(),
        report.failed()
    );
    Ok(())
}
