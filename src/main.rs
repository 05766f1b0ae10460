#[cfg(not(feature = "cli"))]
compile_error!("The `qvd` binary requires the `cli` feature. Build with `--features cli`.");

use std::fs::File;
use std::io::Write;
use std::process;

use clap::Parser;

use qvd::cli;
use qvd::cli::app::{Cli, ColorMode, Commands};
use qvd::QvdError;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let writer_result: Result<Box<dyn Write>, QvdError> = match &cli.output {
        Some(path) => File::create(path).map(|f| Box::new(f) as Box<dyn Write>).map_err(QvdError::Io),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Info { file, json } => cli::info::execute(&cli::info::InfoOptions { file, json }, &mut writer),
        Commands::Dump { file, limit, json } => {
            cli::dump::execute(&cli::dump::DumpOptions { file, limit, json }, &mut writer)
        }
        Commands::Chunks { file, chunk_size } => {
            cli::chunks::execute(&cli::chunks::ChunksOptions { file, chunk_size }, &mut writer)
        }
        Commands::Convert { input, destination, table_name } => cli::convert::execute(
            &cli::convert::ConvertOptions { input, destination, table_name },
            &mut writer,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
