//! Table writer (C7): builds the symbol table, index table and header from
//! an in-memory [`QvdTable`] and writes all three regions.
//!
//! A cell's stored display string is only a starting point: for
//! Date/Time/Timestamp/Interval/Money symbols, the display string actually
//! written is recomputed from the cell's calculation value under
//! [`WriteOptions`]'s formatters, so every symbol of a given type renders
//! under one uniform format regardless of how its originating cell was
//! constructed.

use std::io::Write;

use crate::format::{
    DateValueFormatter, IntervalValueFormatter, MoneyFormat, TimeValueFormatter,
    TimestampValueFormatter,
};
use crate::header::{FieldType, LineageInfo, NumberFormat, QvdFieldHeader, QvdTableHeader};
use crate::index::{bits_needed, encode_record};
use crate::symbols::{dedupe_column, encode_column_symbols};
use crate::table::QvdTable;
use crate::value::QvdValue;
use crate::QvdError;

/// Formatting metadata stamped into the header when writing a table. Does
/// not affect how cells are encoded, only how their `NumberFormat` is
/// described for downstream readers.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub table_name: String,
    pub date_format: String,
    pub time_format: String,
    pub timestamp_format: String,
    pub interval_format: String,
    pub money_format: MoneyFormat,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            date_format: "YYYY-MM-DD".to_string(),
            time_format: "hh:mm:ss".to_string(),
            timestamp_format: "YYYY-MM-DD hh:mm:ss".to_string(),
            interval_format: "D hh:mm:ss".to_string(),
            money_format: MoneyFormat::default(),
        }
    }
}

/// Write `table` in QVD format to `sink`.
pub fn write_table<W: Write>(mut sink: W, table: &QvdTable, options: &WriteOptions) -> Result<(), QvdError> {
    let no_of_records = table.shape().0;

    let mut columns = Vec::with_capacity(table.columns().len());
    for name in table.columns() {
        let values = table.get_column(name)?;
        let owned: Vec<Option<QvdValue>> = values.into_iter().cloned().collect();
        columns.push(build_column(name, &owned, options));
    }

    let mut bit_offset = 0u32;
    for column in &mut columns {
        column.bit_offset = bit_offset;
        bit_offset += column.bit_width;
    }
    let total_bits = bit_offset as usize;
    let record_byte_size = total_bits.div_ceil(8);

    let mut symbol_offset = 0u64;
    for column in &mut columns {
        column.symbol_offset = symbol_offset;
        symbol_offset += column.symbol_bytes.len() as u64;
    }

    let mut index_region = Vec::with_capacity(no_of_records * record_byte_size);
    let fields: Vec<QvdFieldHeader> = columns
        .iter()
        .map(|c| c.field_header(record_byte_size))
        .collect();

    for row in 0..no_of_records {
        let raw: Vec<u64> = columns.iter().map(|c| c.raw_values[row]).collect();
        index_region.extend(encode_record(&raw, &fields, record_byte_size));
    }

    let mut symbol_region = Vec::with_capacity(symbol_offset as usize);
    for column in &columns {
        symbol_region.extend_from_slice(&column.symbol_bytes);
    }

    let header = build_header(table, &fields, &symbol_region, &index_region, options, record_byte_size as u64);

    let xml = header.to_xml()?;
    sink.write_all(xml.as_bytes())?;
    sink.write_all(&[0u8])?;
    sink.write_all(&symbol_region)?;
    sink.write_all(&index_region)?;
    Ok(())
}

/// Intermediate per-column state accumulated while building the symbol and
/// index regions.
struct ColumnBuild {
    name: String,
    symbol_bytes: Vec<u8>,
    symbol_offset: u64,
    no_of_symbols: u32,
    bit_width: u32,
    bit_offset: u32,
    bias: i32,
    raw_values: Vec<u64>,
    number_format: NumberFormat,
    tags: Vec<String>,
}

impl ColumnBuild {
    fn field_header(&self, _record_byte_size: usize) -> QvdFieldHeader {
        let mut header = QvdFieldHeader {
            field_name: self.name.clone(),
            bit_offset: self.bit_offset,
            bit_width: self.bit_width,
            bias: self.bias,
            number_format: self.number_format.clone(),
            no_of_symbols: self.no_of_symbols,
            offset: self.symbol_offset,
            length: self.symbol_bytes.len() as u64,
            comment: String::new(),
            ..Default::default()
        };
        header.set_tags(self.tags.clone());
        header
    }
}

fn build_column(name: &str, values: &[Option<QvdValue>], options: &WriteOptions) -> ColumnBuild {
    let (symbols, index, contains_null) = dedupe_column(values);
    let bias: i32 = if contains_null { -2 } else { 0 };

    let raw_values: Vec<u64> = values
        .iter()
        .map(|v| match v {
            None => 0,
            Some(v) => (index[v] as i64 - bias as i64) as u64,
        })
        .collect();

    let max_raw = raw_values.iter().copied().max().unwrap_or(0);
    let bit_width = bits_needed(max_raw);

    let (number_format, tags) = number_format_and_tags(&symbols, options);

    let reformatted: Vec<QvdValue> = symbols.iter().map(|s| reformat_for_write(s, options)).collect();
    let symbol_bytes = encode_column_symbols(&reformatted);

    ColumnBuild {
        name: name.to_string(),
        symbol_bytes,
        symbol_offset: 0,
        no_of_symbols: symbols.len() as u32,
        bit_width,
        bit_offset: 0,
        bias,
        raw_values,
        number_format,
        tags,
    }
}

/// Recompute the display string of a symbol from its calculation value
/// under `options`'s formatters, so every symbol of a given specialized
/// type renders under one uniform format regardless of how its
/// originating cell was constructed. Non-specialized variants pass
/// through unchanged.
fn reformat_for_write(value: &QvdValue, options: &WriteOptions) -> QvdValue {
    match value {
        QvdValue::Date(days, _) => {
            QvdValue::Date(*days, DateValueFormatter::format(*days, &options.date_format))
        }
        QvdValue::Time(fraction, _) => {
            QvdValue::Time(*fraction, TimeValueFormatter::format(*fraction, &options.time_format))
        }
        QvdValue::Timestamp(v, _) => {
            QvdValue::Timestamp(*v, TimestampValueFormatter::format(*v, &options.timestamp_format))
        }
        QvdValue::Interval(v, _) => {
            QvdValue::Interval(*v, IntervalValueFormatter::format(*v, &options.interval_format))
        }
        QvdValue::Money(v, _) => QvdValue::Money(*v, options.money_format.format(*v)),
        other => other.clone(),
    }
}

/// Classify a column's deduplicated symbols and derive both its
/// `NumberFormat` and its standard tags. Mirrors the reference producer's
/// cascade: a homogeneous specialized type stamps both a header `Type` and
/// its tags; a homogeneous `Integer` column keeps `Type=UNKNOWN` and gets
/// only `$numeric`/`$integer`; any other numeric mix (Integer/Double/dual
/// values) gets `$numeric` alone; an all-string column gets `$text`, plus
/// `$ascii` when every display value is ASCII.
fn number_format_and_tags(symbols: &[QvdValue], options: &WriteOptions) -> (NumberFormat, Vec<String>) {
    let mut nf = NumberFormat::default();

    if symbols.is_empty() {
        return (nf, Vec::new());
    }

    if symbols.iter().all(|s| matches!(s, QvdValue::Time(..))) {
        nf.type_ = FieldType::Time;
        nf.fmt = options.time_format.clone();
        return (nf, vec!["$numeric".to_string()]);
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::Date(..))) {
        nf.type_ = FieldType::Date;
        nf.fmt = options.date_format.clone();
        return (
            nf,
            vec!["$date".to_string(), "$numeric".to_string(), "$integer".to_string()],
        );
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::Timestamp(..))) {
        nf.type_ = FieldType::Timestamp;
        nf.fmt = options.timestamp_format.clone();
        return (nf, vec!["$timestamp".to_string(), "$numeric".to_string()]);
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::Interval(..))) {
        nf.type_ = FieldType::Interval;
        nf.fmt = options.interval_format.clone();
        return (nf, vec!["$numeric".to_string()]);
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::Money(..))) {
        let mf = &options.money_format;
        nf.type_ = FieldType::Money;
        nf.fmt = mf.get_qvd_format_string();
        nf.dec = mf.decimal_separator.to_string();
        nf.thou = mf.thousand_separator.map(|c| c.to_string()).unwrap_or_default();
        nf.use_thou = if mf.thousand_separator.is_some() { 1 } else { 0 };
        nf.n_dec = mf.precision as i32;
        return (nf, vec!["$numeric".to_string()]);
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::Integer(..))) {
        return (nf, vec!["$numeric".to_string(), "$integer".to_string()]);
    }
    if symbols.iter().all(|s| {
        matches!(
            s,
            QvdValue::Integer(..) | QvdValue::Double(..) | QvdValue::DualInteger(..) | QvdValue::DualDouble(..)
        )
    }) {
        return (nf, vec!["$numeric".to_string()]);
    }
    if symbols.iter().all(|s| matches!(s, QvdValue::String(..))) {
        let mut tags = vec!["$text".to_string()];
        if symbols.iter().all(|s| s.display_value().is_ascii()) {
            tags.push("$ascii".to_string());
        }
        return (nf, tags);
    }

    (nf, Vec::new())
}

fn build_header(
    table: &QvdTable,
    fields: &[QvdFieldHeader],
    symbol_region: &[u8],
    index_region: &[u8],
    options: &WriteOptions,
    record_byte_size: u64,
) -> QvdTableHeader {
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut header = QvdTableHeader {
        qv_build_no: 50668,
        creator_doc: uuid::Uuid::new_v4().to_string(),
        create_utc_time: now.clone(),
        source_create_utc_time: String::new(),
        source_file_utc_time: String::new(),
        stale_utc_time: now,
        table_name: options.table_name.clone(),
        source_file_size: -1,
        compression: String::new(),
        record_byte_size,
        no_of_records: table.shape().0 as u64,
        offset: symbol_region.len() as u64,
        length: index_region.len() as u64,
        comment: String::new(),
        ..Default::default()
    };
    header.set_fields(fields.to_vec());
    header.set_lineage(vec![LineageInfo {
        discriminator: "qvd".to_string(),
        statement: "Generated".to_string(),
    }]);
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_table;

    #[test]
    fn empty_table_writes_zero_records() {
        let table = QvdTable::new(vec!["a".to_string()], vec![]).unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();
        let read_back = read_table(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(read_back.shape(), (0, 1));
    }

    #[test]
    fn single_symbol_column_gets_zero_bit_width() {
        let table = QvdTable::new(
            vec!["a".to_string()],
            vec![
                vec![Some(QvdValue::Integer(7))],
                vec![Some(QvdValue::Integer(7))],
            ],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();

        let xml_end = buf.windows(3).position(|w| w == b"\r\n\0").unwrap();
        let xml = std::str::from_utf8(&buf[..xml_end]).unwrap();
        assert!(xml.contains("<BitWidth>0</BitWidth>"));
    }

    #[test]
    fn dates_roundtrip_with_calculation_value_intact() {
        let table = QvdTable::new(
            vec!["d".to_string()],
            vec![vec![Some(QvdValue::Date(1, "1899-12-31".to_string()))]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();
        let read_back = read_table(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(
            read_back.get_cell(0, "d").unwrap(),
            &Some(QvdValue::Date(1, "1899-12-31".to_string()))
        );
    }

    #[test]
    fn writer_overwrites_a_stale_display_string_with_the_formatted_one() {
        let table = QvdTable::new(
            vec!["d".to_string()],
            vec![vec![Some(QvdValue::Date(1, "whatever the caller typed".to_string()))]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, &WriteOptions::default()).unwrap();
        let read_back = read_table(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(
            read_back.get_cell(0, "d").unwrap(),
            &Some(QvdValue::Date(1, "1899-12-31".to_string()))
        );
    }

    #[test]
    fn number_format_and_tags_match_reference_cascade() {
        let dates = vec![QvdValue::Date(1, "x".to_string())];
        let (nf, tags) = number_format_and_tags(&dates, &WriteOptions::default());
        assert_eq!(nf.type_, FieldType::Date);
        assert_eq!(tags, vec!["$date", "$numeric", "$integer"]);

        let integers = vec![QvdValue::Integer(1), QvdValue::Integer(2)];
        let (nf, tags) = number_format_and_tags(&integers, &WriteOptions::default());
        assert_eq!(nf.type_, FieldType::Unknown);
        assert_eq!(tags, vec!["$numeric", "$integer"]);

        let mixed_numeric = vec![QvdValue::Integer(1), QvdValue::Double(2.5)];
        let (nf, tags) = number_format_and_tags(&mixed_numeric, &WriteOptions::default());
        assert_eq!(nf.type_, FieldType::Unknown);
        assert_eq!(tags, vec!["$numeric"]);

        let strings = vec![QvdValue::String("abc".to_string())];
        let (nf, tags) = number_format_and_tags(&strings, &WriteOptions::default());
        assert_eq!(nf.type_, FieldType::Unknown);
        assert_eq!(tags, vec!["$text", "$ascii"]);

        let non_ascii_strings = vec![QvdValue::String("café".to_string())];
        let (_, tags) = number_format_and_tags(&non_ascii_strings, &WriteOptions::default());
        assert_eq!(tags, vec!["$text"]);
    }
}
