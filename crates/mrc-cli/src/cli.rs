use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mrc", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Roll a chart of accounts up into FOAK and NOAK costs for one design
    Estimate {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Estimate cost uncertainty by resampling the low/high cost ranges
    Sample {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Evaluate every design of a design set in parallel
    Batch {
        /// Design set file (YAML or JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        designs: PathBuf,
        /// Output directory for per-design reports and the batch manifest
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
        /// What each job computes (estimate, sample)
        #[arg(long, value_enum, default_value_t = BatchTask::Estimate)]
        task: BatchTask,
        /// Worker threads (0 = all cores)
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[command(flatten)]
        overrides: SharedInputOverrides,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Design set utilities
    Designs {
        #[command(subcommand)]
        command: DesignsCommands,
    },
    /// Print the multiplier restating one year's dollars in another year
    Inflation {
        /// Inflation index CSV
        #[arg(long, value_hint = ValueHint::FilePath)]
        index: PathBuf,
        /// Index column (e.g. CPI)
        #[arg(long)]
        column: String,
        /// Dollar year the cost is quoted in
        #[arg(long)]
        from: i32,
        /// Dollar year to restate into
        #[arg(long)]
        to: i32,
    },
    /// Print the non-standard cost law assigned to each account
    Laws {
        /// Law registry YAML; the built-in registry when omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        laws: Option<PathBuf>,
    },
}

/// The tables one estimate reads.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Chart-of-accounts CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub chart: PathBuf,
    /// Inflation index CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub index: PathBuf,
    /// Design parameters (YAML or JSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub params: PathBuf,
    /// Economics parameters CSV; overrides design parameters on collision
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub economics: Option<PathBuf>,
    /// Non-standard law registry replacing the built-in one
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub laws: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write the cost table here (.csv or .json)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
    /// Write the flat cost summary dictionary (JSON) here
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub dictionary: Option<PathBuf>,
    /// Design parameters to carry into the summary dictionary (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub track: Vec<String>,
    /// Print every account instead of only the summary rows
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SamplingArgs {
    /// Number of samples
    #[arg(long, default_value_t = 100)]
    pub samples: usize,
    /// Sampling distribution (lognormal, truncated-normal, uniform)
    #[arg(long, default_value = "lognormal")]
    pub distribution: String,
    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Replace the tables named in a design set file.
#[derive(Args, Debug, Clone)]
pub struct SharedInputOverrides {
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub chart: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub index: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub economics: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub laws: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum DesignsCommands {
    /// Check a design set and load every parameter file it names
    Validate {
        /// Design set file (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        set: PathBuf,
    },
    /// List the designs of a set
    List {
        /// Design set file (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        set: PathBuf,
        /// Output format for the listing
        #[arg(long, value_enum, default_value_t = ListFormat::Plain)]
        format: ListFormat,
        /// Also write a design manifest (JSON) here
        #[arg(long, value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum BatchTask {
    Estimate,
    Sample,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ListFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
