use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::OutputFormat;
use crate::utils::constants::DEFAULT_PREVIEW_ROWS;

#[derive(Parser)]
#[command(name = "acidentes-processor")]
#[command(about = "Consolidates yearly federal-highway accident CSV exports into one analysis-ready table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress spinner")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

/// Where the pipeline settings come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(short, long, help = "Directory holding the yearly CSV files [default: data]")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "TOML/JSON/YAML settings file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, clean, enrich and write the consolidated table
    Process {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            short,
            long,
            help = "Output file name inside the data directory [default: acidentes_consolidados.csv]"
        )]
        output_file: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short, long, help = "Parquet compression (snappy, gzip, lz4, zstd, none)")]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, help = "Write the stage report as JSON")]
        report_json: Option<PathBuf>,
    },

    /// List declared source files missing from the data directory
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the first rows of one source file as it loads
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(help = "Declared source file name, e.g. 2021.csv")]
        file: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },

    /// Summary statistics of a consolidated CSV output
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, help = "TOML/JSON/YAML settings file (column names)")]
        config: Option<PathBuf>,
    },
}
