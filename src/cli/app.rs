//! Command-line argument schema.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "qvd", version, about = "Read and write QVD (QlikView Data) files")]
pub struct Cli {
    /// When to use colored output.
    #[arg(long, value_enum, global = true, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout.
    #[arg(short = 'o', long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Always,
    Never,
    Auto,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Always => write!(f, "always"),
            ColorMode::Never => write!(f, "never"),
            ColorMode::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a QVD file's header metadata (table name, row/column counts,
    /// creation time).
    Info {
        file: PathBuf,
        /// Emit machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print a QVD file's rows.
    Dump {
        file: PathBuf,
        /// Only print the first N rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Emit machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Read a QVD file chunk by chunk, reporting progress.
    Chunks {
        file: PathBuf,
        #[arg(long, default_value_t = 10_000)]
        chunk_size: usize,
    },
    /// Re-encode a QVD file, optionally renaming its table.
    Convert {
        input: PathBuf,
        /// Destination path for the re-encoded file (distinct from the
        /// global `-o`, which only redirects this command's own messages).
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,
        #[arg(long)]
        table_name: Option<String>,
    },
}
