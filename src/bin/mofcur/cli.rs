use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "mofcur",
    about = "MOF crystal-structure curation",
    version,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize structures to P1 symmetry
    #[command(visible_alias = "c")]
    Clean(CleanArgs),

    /// Check structures for chemical plausibility
    #[command(visible_alias = "v")]
    Validate(ValidateArgs),

    /// Screen chemical formulas for integer multiples
    #[command(visible_alias = "d")]
    Duplicates(DuplicatesArgs),
}

/// Batch options shared by the per-structure commands.
#[derive(Args)]
pub struct BatchOptions {
    /// Input CIF files or glob patterns
    #[arg(value_name = "CIF", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Worker threads (0 = all logical CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub batch: BatchOptions,

    /// Directory for cleaned structures (defaults to alongside each input)
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Filename suffix replacing the input extension
    #[arg(long, value_name = "SUFFIX", default_value = "_P1.cif")]
    pub suffix: String,

    /// Keep a copy of the raw input next to the cleaned file
    #[arg(long)]
    pub keep_original: bool,

    /// Remove disordered/partially occupied sites before parsing
    #[arg(long)]
    pub remove_disorder: bool,

    /// File with asymmetric-unit labels to keep, one per line
    /// (defaults to every site declared in the record)
    #[arg(long, value_name = "FILE")]
    pub atoms: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub batch: BatchOptions,

    /// Which checks to run
    #[arg(long, value_name = "CHECK", default_value = "all")]
    pub check: Check,

    /// Append report lines to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Check {
    /// Overlapping sites and hypervalent atoms
    #[default]
    All,
    /// Overlapping atomic sites only
    Overlap,
    /// Hypervalent H/C/O/halogen sites only
    Valence,
}

#[derive(Args)]
pub struct DuplicatesArgs {
    /// CIF files or glob patterns to compute formula sums from
    #[arg(value_name = "CIF", num_args = 0..)]
    pub inputs: Vec<String>,

    /// Text file of formula sums, one per line (instead of CIF inputs)
    #[arg(long, value_name = "FILE", conflicts_with = "inputs")]
    pub formulas: Option<PathBuf>,

    /// Suppress the banner (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
