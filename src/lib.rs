//! QVD file codec.
//!
//! The `qvd` crate provides Rust types and functions for reading and writing
//! QVD files — the columnar, dictionary-encoded format produced by Qlik's
//! BI tools. A QVD file is an XML metadata header followed by two binary
//! regions: a per-column symbol table holding each column's distinct values,
//! and a row-major index table whose rows are bit-packed references into
//! those symbol tables.
//!
//! ## Quick example
//!
//! ```no_run
//! use qvd::{read_table, write_table, WriteOptions};
//! use std::fs::File;
//!
//! let table = read_table(File::open("table.qvd").unwrap()).unwrap();
//! println!("{} rows, {} columns", table.shape().0, table.shape().1);
//!
//! write_table(File::create("out.qvd").unwrap(), &table, &WriteOptions::default()).unwrap();
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`value`] | Typed cell variants (`QvdValue`), display/calculation projections, canonical byte encoding |
//! | [`format`] | Date/time/timestamp/interval/money formatters |
//! | [`header`] | XML header schema, parse/serialize |
//! | [`table`] | In-memory `QvdTable` (rows, columns, row/column accessors) |
//! | [`symbols`] | Per-column symbol table codec |
//! | [`index`] | Bit-packed index table codec |
//! | [`reader`] | Whole-file and chunked readers |
//! | [`writer`] | Symbol/index/header builder and writer |
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | on | Builds the `qvd` binary (`info`, `dump`, `chunks`, `convert` subcommands). |

#[cfg(feature = "cli")]
pub mod cli;
pub mod format;
pub mod header;
pub mod index;
pub mod reader;
pub mod symbols;
pub mod table;
pub mod value;
pub mod writer;

pub use reader::{read_chunked, read_table, ChunkedReader};
pub use table::QvdTable;
pub use value::QvdValue;
pub use writer::{write_table, WriteOptions};

use thiserror::Error;

/// Errors returned by `qvd` operations.
#[derive(Error, Debug)]
pub enum QvdError {
    /// An I/O error occurred (file open, read, seek, or write failure).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `\r\n\0` sequence separating the XML header from the binary
    /// regions was not found.
    #[error("header terminator (CR LF NUL) not found")]
    MissingHeaderTerminator,

    /// The header XML could not be parsed, or a mandatory element was
    /// missing.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A symbol's leading tag byte was not one of the recognized types.
    #[error("unknown symbol tag: 0x{0:02x}")]
    UnknownSymbolTag(u8),

    /// A string symbol was not valid UTF-8.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A binary region was shorter than its declared length required.
    #[error("truncated {region}: expected at least {expected} bytes, found {found}")]
    Truncated {
        region: &'static str,
        expected: usize,
        found: usize,
    },

    /// A decoded symbol index fell outside the bounds of its field's symbol
    /// table.
    #[error("field {field}: symbol index {idx} out of range (0..{len})")]
    IndexOutOfRange {
        field: String,
        idx: i64,
        len: usize,
    },

    /// A chunk offset or size fell outside the valid record range.
    #[error("chunk out of range: {0}")]
    OutOfRange(String),

    /// The supplied source or sink is not usable for the requested mode.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    /// A table-construction invariant was violated (ragged rows, duplicate
    /// column names, out-of-range row/column access).
    #[error("schema error: {0}")]
    Schema(String),
}
