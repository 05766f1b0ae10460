//! QVD header schema (C3).
//!
//! The header is an XML document terminated by the byte sequence
//! `\r\n\0` (the final `\0` also opens the binary region that follows). It
//! describes both the logical schema (field names, number formats) and the
//! physical layout (bit offsets/widths, symbol-region offsets) of the two
//! binary regions.

use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};

use crate::QvdError;

/// The byte sequence that separates the XML header from the binary
/// regions. The trailing NUL is the first byte of the one-byte separator
/// written between the header and the symbol region.
pub const HEADER_DELIMITER: &[u8] = b"\r\n\0";

/// The declared type of a field's number format, used to disambiguate
/// `0x05`/`0x06` dual symbol payloads into specialized [`crate::QvdValue`]
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "ASCII")]
    Ascii,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "INTERVAL")]
    Interval,
    #[serde(rename = "FIX")]
    Fix,
    #[serde(rename = "MONEY")]
    Money,
}

/// Number-format metadata for one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(rename = "Type")]
    pub type_: FieldType,
    #[serde(rename = "nDec")]
    pub n_dec: i32,
    #[serde(rename = "UseThou")]
    pub use_thou: i32,
    #[serde(rename = "Fmt", default)]
    pub fmt: String,
    #[serde(rename = "Dec", default)]
    pub dec: String,
    #[serde(rename = "Thou", default)]
    pub thou: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tags {
    #[serde(rename = "String", default)]
    string: Vec<String>,
}

/// Metadata describing one field/column in a QVD file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QvdFieldHeader {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "BitOffset")]
    pub bit_offset: u32,
    #[serde(rename = "BitWidth")]
    pub bit_width: u32,
    #[serde(rename = "Bias")]
    pub bias: i32,
    #[serde(rename = "NumberFormat")]
    pub number_format: NumberFormat,
    #[serde(rename = "NoOfSymbols")]
    pub no_of_symbols: u32,
    #[serde(rename = "Offset")]
    pub offset: u64,
    #[serde(rename = "Length")]
    pub length: u64,
    #[serde(rename = "Comment", default)]
    pub comment: String,
    #[serde(rename = "Tags", default)]
    pub(crate) tags: Tags,
}

impl QvdFieldHeader {
    /// The field's standard tags (`$numeric`, `$integer`, `$text`, …).
    pub fn tags(&self) -> &[String] {
        &self.tags.string
    }

    /// Replace the field's standard tags.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = Tags { string: tags };
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Fields {
    #[serde(rename = "QvdFieldHeader", default)]
    field: Vec<QvdFieldHeader>,
}

/// One entry in the table's lineage (provenance of the data, e.g. the load
/// script statement that produced it).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageInfo {
    #[serde(rename = "Discriminator", default)]
    pub discriminator: String,
    #[serde(rename = "Statement", default)]
    pub statement: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Lineage {
    #[serde(rename = "LineageInfo", default)]
    lineage_info: Vec<LineageInfo>,
}

/// The full header of a QVD file: logical schema plus physical layout of
/// the symbol and index regions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "QvdTableHeader")]
pub struct QvdTableHeader {
    #[serde(rename = "QvBuildNo")]
    pub qv_build_no: i64,
    #[serde(rename = "CreatorDoc", default)]
    pub creator_doc: String,
    #[serde(rename = "CreateUtcTime", default)]
    pub create_utc_time: String,
    #[serde(rename = "SourceCreateUtcTime", default)]
    pub source_create_utc_time: String,
    #[serde(rename = "SourceFileUtcTime", default)]
    pub source_file_utc_time: String,
    #[serde(rename = "StaleUtcTime", default)]
    pub stale_utc_time: String,
    #[serde(rename = "TableName", default)]
    pub table_name: String,
    #[serde(rename = "SourceFileSize")]
    pub source_file_size: i64,
    #[serde(rename = "Fields", default)]
    pub(crate) fields: Fields,
    /// Always empty; the format reserves this field but QVD never uses it
    /// (see spec Non-goals: compression is not implemented).
    #[serde(rename = "Compression", default)]
    pub compression: String,
    #[serde(rename = "RecordByteSize")]
    pub record_byte_size: u64,
    #[serde(rename = "NoOfRecords")]
    pub no_of_records: u64,
    /// Total byte length of the symbol region.
    #[serde(rename = "Offset")]
    pub offset: u64,
    /// Total byte length of the index region.
    #[serde(rename = "Length")]
    pub length: u64,
    #[serde(rename = "Comment", default)]
    pub comment: String,
    #[serde(rename = "Lineage", default)]
    pub(crate) lineage: Lineage,
}

impl QvdTableHeader {
    pub fn fields(&self) -> &[QvdFieldHeader] {
        &self.fields.field
    }

    pub fn fields_mut(&mut self) -> &mut Vec<QvdFieldHeader> {
        &mut self.fields.field
    }

    pub fn set_fields(&mut self, fields: Vec<QvdFieldHeader>) {
        self.fields = Fields { field: fields };
    }

    pub fn lineage(&self) -> &[LineageInfo] {
        &self.lineage.lineage_info
    }

    pub fn set_lineage(&mut self, lineage: Vec<LineageInfo>) {
        self.lineage = Lineage {
            lineage_info: lineage,
        };
    }

    /// Parse the XML header bytes (without the trailing `\r\n\0`
    /// delimiter).
    pub fn parse(xml: &str) -> Result<Self, QvdError> {
        from_str(xml).map_err(|e| QvdError::MalformedHeader(e.to_string()))
    }

    /// Serialize the header to XML, `\r\n`-terminated lines, with an XML
    /// declaration (matches the reference producer's on-disk shape).
    pub fn to_xml(&self) -> Result<String, QvdError> {
        let mut body = String::new();
        let mut ser = Serializer::new(&mut body);
        ser.indent(' ', 2);
        self.serialize(ser)
            .map_err(|e| QvdError::MalformedHeader(e.to_string()))?;

        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n");
        for line in body.lines() {
            out.push_str(line);
            out.push_str("\r\n");
        }
        Ok(out)
    }
}
