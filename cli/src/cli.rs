use std::path::PathBuf;

/// Redistricting CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "districtor", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Split census blocks into population-balanced contiguous districts
    Split(SplitArgs),
}

#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    /// Census blocks as a GeoJSON FeatureCollection
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Number of districts
    #[arg(short = 'n', long)]
    pub districts: usize,

    /// Output GeoJSON file, defaults to "./districts.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Allowed deviation from each district's ideal population
    #[arg(long, default_value_t = 0)]
    pub deviation: u64,

    /// Fill scoring: distance, compactness or cardinal-distance
    #[arg(long, default_value = "cardinal-distance")]
    pub weighting: String,

    /// Groups to decompose on a missed fill: split-groups-on-edge or split-best-candidate-group
    #[arg(long, default_value = "split-groups-on-edge")]
    pub breaking: String,

    /// Merge decomposed fragments back into their former groups after each cut
    #[arg(long)]
    pub merge: bool,

    /// Restart every fill from the district border
    #[arg(long)]
    pub refill: bool,

    /// Score compactness on exact shapes instead of bounding boxes
    #[arg(long)]
    pub exact: bool,

    /// Write diagnostic snapshots and plots into this directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub dump_dir: Option<PathBuf>,
}
