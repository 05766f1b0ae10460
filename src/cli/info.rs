use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::reader::read_table;
use crate::QvdError;

pub struct InfoOptions {
    pub file: PathBuf,
    pub json: bool,
}

pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    log::info!("reading header of {}", opts.file.display());
    let table = read_table(File::open(&opts.file)?)?;
    let (rows, cols) = table.shape();

    if opts.json {
        let json = serde_json::json!({
            "file": opts.file.display().to_string(),
            "rows": rows,
            "columns": table.columns(),
        });
        writeln!(writer, "{json}")?;
    } else {
        writeln!(writer, "{}", opts.file.display())?;
        writeln!(writer, "  rows:    {rows}")?;
        writeln!(writer, "  columns: {cols}")?;
        for name in table.columns() {
            writeln!(writer, "    - {name}")?;
        }
    }
    Ok(())
}
