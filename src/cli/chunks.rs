use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::reader::read_chunked;
use crate::QvdError;

pub struct ChunksOptions {
    pub file: PathBuf,
    pub chunk_size: usize,
}

pub fn execute(opts: &ChunksOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    log::info!("reading {} in chunks of {}", opts.file.display(), opts.chunk_size);
    let reader = read_chunked(File::open(&opts.file)?, opts.chunk_size)?;
    let total = reader.header().no_of_records;

    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} rows") {
        bar.set_style(style);
    }

    let mut seen = 0u64;
    for chunk in reader {
        let chunk = chunk?;
        seen += chunk.shape().0 as u64;
        bar.set_position(seen);
    }
    bar.finish();

    writeln!(writer, "read {seen} rows from {} in chunks of {}", opts.file.display(), opts.chunk_size)?;
    Ok(())
}
