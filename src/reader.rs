//! Whole-file and chunked readers (C6).
//!
//! A QVD file is an XML header, a `\r\n\0` delimiter, a symbol region, and
//! an index region. The header's `Offset` field is the byte offset of the
//! index region measured from the start of the binary data — which is
//! exactly the symbol region's total length, since the symbol region
//! starts there. `Length` is the index region's byte length.

use std::io::{Read, Seek, SeekFrom};

use crate::header::{QvdFieldHeader, QvdTableHeader, HEADER_DELIMITER};
use crate::index::decode_index_region;
use crate::symbols::decode_field_symbols;
use crate::table::QvdTable;
use crate::value::QvdValue;
use crate::QvdError;

/// Read an entire QVD file into a [`QvdTable`].
pub fn read_table<R: Read>(mut reader: R) -> Result<QvdTable, QvdError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let (header, delimiter_end) = parse_header(&buf)?;

    let symbol_region = region(&buf, delimiter_end, 0, header.offset as usize, "symbol table")?;
    let index_region = region(
        &buf,
        delimiter_end,
        header.offset as usize,
        header.length as usize,
        "index table",
    )?;

    build_table(&header, symbol_region, index_region)
}

/// Open a QVD source for chunked reading. The symbol region is decoded
/// once up front; each call to [`ChunkedReader::next`] seeks to and reads
/// only the index bytes for its chunk, so memory use stays bounded by
/// `chunk_size` rows rather than the whole file.
pub fn read_chunked<R: Read + Seek>(mut reader: R, chunk_size: usize) -> Result<ChunkedReader<R>, QvdError> {
    if chunk_size == 0 {
        return Err(QvdError::UnsupportedSource("chunk size must be greater than zero".to_string()));
    }

    let mut prefix = Vec::new();
    reader.by_ref().take(u64::MAX).read_to_end(&mut prefix)?;
    let (header, delimiter_end) = parse_header(&prefix)?;
    let symbol_region = region(&prefix, delimiter_end, 0, header.offset as usize, "symbol table")?;

    let symbols: Vec<Vec<QvdValue>> = header
        .fields()
        .iter()
        .map(|field| decode_field_symbols(symbol_region, field))
        .collect::<Result<_, _>>()?;

    let index_region_start = (delimiter_end + header.offset as usize) as u64;

    Ok(ChunkedReader {
        reader,
        header,
        symbols,
        index_region_start,
        chunk_size,
        next_row: 0,
    })
}

fn parse_header(buf: &[u8]) -> Result<(QvdTableHeader, usize), QvdError> {
    let pos = buf
        .windows(HEADER_DELIMITER.len())
        .position(|w| w == HEADER_DELIMITER)
        .ok_or(QvdError::MissingHeaderTerminator)?;
    let xml = std::str::from_utf8(&buf[..pos]).map_err(|e| QvdError::MalformedHeader(e.to_string()))?;
    let header = QvdTableHeader::parse(xml)?;
    Ok((header, pos + HEADER_DELIMITER.len()))
}

fn region<'a>(
    buf: &'a [u8],
    body_start: usize,
    relative_start: usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], QvdError> {
    let start = body_start + relative_start;
    let end = start + len;
    buf.get(start..end).ok_or(QvdError::Truncated {
        region: name,
        expected: end.saturating_sub(body_start),
        found: buf.len().saturating_sub(body_start),
    })
}

fn build_table(header: &QvdTableHeader, symbol_region: &[u8], index_region: &[u8]) -> Result<QvdTable, QvdError> {
    let symbols: Vec<Vec<QvdValue>> = header
        .fields()
        .iter()
        .map(|field| decode_field_symbols(symbol_region, field))
        .collect::<Result<_, _>>()?;

    let records = decode_index_region(
        index_region,
        header.fields(),
        header.no_of_records,
        header.record_byte_size,
    )?;

    assemble_rows(header.fields(), &symbols, &records)
}

fn assemble_rows(
    fields: &[QvdFieldHeader],
    symbols: &[Vec<QvdValue>],
    records: &[Vec<i64>],
) -> Result<QvdTable, QvdError> {
    let columns = fields.iter().map(|f| f.field_name.clone()).collect();

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let mut row = Vec::with_capacity(fields.len());
        for (field, (&idx, column_symbols)) in fields.iter().zip(record.iter().zip(symbols)) {
            row.push(resolve_symbol(field, idx, column_symbols)?);
        }
        rows.push(row);
    }

    QvdTable::new(columns, rows)
}

fn resolve_symbol(field: &QvdFieldHeader, idx: i64, symbols: &[QvdValue]) -> Result<Option<QvdValue>, QvdError> {
    if idx < 0 {
        return Ok(None);
    }
    symbols
        .get(idx as usize)
        .cloned()
        .map(Some)
        .ok_or_else(|| QvdError::IndexOutOfRange {
            field: field.field_name.clone(),
            idx,
            len: symbols.len(),
        })
}

/// Iterates a QVD file's rows in fixed-size chunks, re-reading only the
/// index bytes each chunk needs.
pub struct ChunkedReader<R> {
    reader: R,
    header: QvdTableHeader,
    symbols: Vec<Vec<QvdValue>>,
    index_region_start: u64,
    chunk_size: usize,
    next_row: usize,
}

impl<R: Read + Seek> ChunkedReader<R> {
    pub fn header(&self) -> &QvdTableHeader {
        &self.header
    }

    /// Jump directly to a row offset. Returns [`QvdError::OutOfRange`] if
    /// `row` is past the last record.
    pub fn seek_to_row(&mut self, row: usize) -> Result<(), QvdError> {
        if row > self.header.no_of_records as usize {
            return Err(QvdError::OutOfRange(format!(
                "row {row} out of range (0..={})",
                self.header.no_of_records
            )));
        }
        self.next_row = row;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Option<QvdTable>, QvdError> {
        let total_records = self.header.no_of_records as usize;
        if self.next_row >= total_records {
            return Ok(None);
        }

        let record_byte_size = self.header.record_byte_size as usize;
        let rows_in_chunk = self.chunk_size.min(total_records - self.next_row);
        let byte_offset = self.index_region_start + (self.next_row * record_byte_size) as u64;
        let byte_len = rows_in_chunk * record_byte_size;

        self.reader.seek(SeekFrom::Start(byte_offset))?;
        let mut buf = vec![0u8; byte_len];
        self.reader.read_exact(&mut buf)?;

        let records = decode_index_region(&buf, self.header.fields(), rows_in_chunk as u64, record_byte_size as u64)?;
        let table = assemble_rows(self.header.fields(), &self.symbols, &records)?;

        self.next_row += rows_in_chunk;
        Ok(Some(table))
    }
}

impl<R: Read + Seek> Iterator for ChunkedReader<R> {
    type Item = Result<QvdTable, QvdError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_chunk().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{write_table, WriteOptions};
    use std::io::Cursor;

    fn sample_table() -> QvdTable {
        QvdTable::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Some(QvdValue::Integer(1)), Some(QvdValue::String("alice".to_string()))],
                vec![Some(QvdValue::Integer(2)), Some(QvdValue::String("bob".to_string()))],
                vec![Some(QvdValue::Integer(3)), None],
            ],
        )
        .unwrap()
    }

    #[test]
    fn whole_file_roundtrip() {
        let table = sample_table();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();

        let read_back = read_table(Cursor::new(buf)).unwrap();
        assert_eq!(read_back.shape(), table.shape());
        assert_eq!(read_back.get_cell(2, "name").unwrap(), &None);
        assert_eq!(read_back.get_cell(0, "id").unwrap(), &Some(QvdValue::Integer(1)));
    }

    #[test]
    fn chunked_read_matches_whole_file_read() {
        let table = sample_table();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();

        let whole = read_table(Cursor::new(buf.clone())).unwrap();
        let chunked = read_chunked(Cursor::new(buf), 2).unwrap();
        let mut rows = Vec::new();
        for chunk in chunked {
            let chunk = chunk.unwrap();
            rows.extend(chunk.rows().to_vec());
        }
        assert_eq!(rows, whole.rows().to_vec());
    }

    #[test]
    fn missing_delimiter_is_fatal() {
        let err = read_table(Cursor::new(b"not a qvd file".to_vec())).unwrap_err();
        assert!(matches!(err, QvdError::MissingHeaderTerminator));
    }
}
