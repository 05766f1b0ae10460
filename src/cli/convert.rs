use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::reader::read_table;
use crate::writer::{write_table, WriteOptions};
use crate::QvdError;

pub struct ConvertOptions {
    pub input: PathBuf,
    pub destination: PathBuf,
    pub table_name: Option<String>,
}

pub fn execute(opts: &ConvertOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    log::info!("converting {} -> {}", opts.input.display(), opts.destination.display());
    let table = read_table(File::open(&opts.input)?)?;

    let mut options = WriteOptions::default();
    if let Some(name) = &opts.table_name {
        options.table_name = name.clone();
    }

    write_table(File::create(&opts.destination)?, &table, &options)?;
    writeln!(
        writer,
        "wrote {} rows, {} columns to {}",
        table.shape().0,
        table.shape().1,
        opts.destination.display()
    )?;
    Ok(())
}
