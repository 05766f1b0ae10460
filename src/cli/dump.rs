use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::reader::read_table;
use crate::QvdError;

pub struct DumpOptions {
    pub file: PathBuf,
    pub limit: Option<usize>,
    pub json: bool,
}

pub fn execute(opts: &DumpOptions, writer: &mut dyn Write) -> Result<(), QvdError> {
    log::info!("dumping {}", opts.file.display());
    let table = read_table(File::open(&opts.file)?)?;
    let rows = match opts.limit {
        Some(limit) => table.slice_rows(0, limit.min(table.shape().0))?,
        None => table,
    };

    if opts.json {
        let json: Vec<_> = rows
            .to_dict()
            .into_iter()
            .map(|row| {
                serde_json::Map::from_iter(
                    row.into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v.map(|v| v.display_value()).unwrap_or_default()))),
                )
            })
            .collect();
        let rendered = serde_json::to_string_pretty(&json).map_err(|e| QvdError::Schema(e.to_string()))?;
        writeln!(writer, "{rendered}")?;
    } else {
        writeln!(writer, "{rows}")?;
    }
    Ok(())
}
