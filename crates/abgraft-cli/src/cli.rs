use abgraft::core::models::chain::ChainType;
use abgraft::core::models::scheme::{CdrDefinition, Scheme};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "abgraft - humanize antibody variable domains by grafting their CDRs onto human germline frameworks.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to humanize records in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Humanize every chain in FASTA files, or one pair from stdin, by CDR grafting.
    Graft(GraftArgs),
    /// List the human germline reference set.
    Germlines(GermlinesArgs),
}

/// Arguments for the `graft` subcommand.
#[derive(Args, Debug)]
pub struct GraftArgs {
    // --- Core Arguments ---
    /// Input FASTA files. Each record is detected as a heavy or light chain.
    /// Without inputs, one VH and/or VL is read from stdin and humanized as a
    /// pair, and the alignment is printed.
    #[arg(value_name = "FASTA")]
    pub inputs: Vec<PathBuf>,

    /// Output directory for humanized.fa and alignments.txt, or the FASTA file
    /// path with --fasta-only. Humanized FASTA goes to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Germline reference set in TOML format. Defaults to the built-in set.
    #[arg(long, value_name = "PATH")]
    pub germlines: Option<PathBuf>,

    // --- Humanization Overrides ---
    /// Numbering scheme (imgt, aho, chothia, kabat).
    #[arg(long, value_name = "SCHEME")]
    pub scheme: Option<Scheme>,

    /// CDR definition (imgt, chothia, kabat, north).
    #[arg(long, value_name = "DEFINITION")]
    pub cdr_definition: Option<CdrDefinition>,

    /// Heavy chain V germline, or 'auto' for the closest one.
    #[arg(long, value_name = "ID")]
    pub heavy_v_germline: Option<String>,

    /// Light chain V germline, or 'auto' for the closest one.
    #[arg(long, value_name = "ID")]
    pub light_v_germline: Option<String>,

    /// Heavy chain J germline, or 'auto' for the closest one.
    #[arg(long, value_name = "ID")]
    pub heavy_j_germline: Option<String>,

    /// Light chain J germline, or 'auto' for the closest one.
    #[arg(long, value_name = "ID")]
    pub light_j_germline: Option<String>,

    /// Restore parental residues at Vernier-zone framework positions.
    #[arg(long)]
    pub backmutate_vernier: bool,

    // --- Output Control ---
    /// Only process the first N records across all inputs.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Skip the alignment report and write humanized FASTA to the --output file.
    #[arg(long)]
    pub fasta_only: bool,
}

/// Arguments for the `germlines` subcommand.
#[derive(Args, Debug)]
pub struct GermlinesArgs {
    /// Only list germlines of this chain type (heavy, kappa, lambda).
    #[arg(long, value_name = "CHAIN")]
    pub chain: Option<ChainType>,

    /// Germline reference set in TOML format. Defaults to the built-in set.
    #[arg(long, value_name = "PATH")]
    pub germlines: Option<PathBuf>,
}
