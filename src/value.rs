//! Typed cell values (C1).
//!
//! A [`QvdValue`] is a tagged variant carrying a calculation projection
//! (used for ordering) and a display projection (used for presentation).
//! Equality and hashing are defined on the canonical byte encoding, so two
//! dual values that share a calculation value but differ in display string
//! are distinct (see [`QvdValue::encode`]).

use std::hash::{Hash, Hasher};
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::header::FieldType;
use crate::QvdError;

const TAG_INTEGER: u8 = 0x01;
const TAG_DOUBLE: u8 = 0x02;
const TAG_STRING: u8 = 0x04;
const TAG_DUAL_INTEGER: u8 = 0x05;
const TAG_DUAL_DOUBLE: u8 = 0x06;

/// A single typed cell value.
///
/// `Date`/`Time`/`Timestamp`/`Interval` share the on-disk shape of
/// `DualInteger`/`DualDouble` respectively; which Rust variant a decoded
/// symbol becomes depends on the owning field's declared [`FieldType`], not
/// on the tag byte alone (see [`QvdValue::decode`]).
#[derive(Debug, Clone)]
pub enum QvdValue {
    Integer(i32),
    Double(f64),
    String(String),
    DualInteger(i32, String),
    DualDouble(f64, String),
    Date(i32, String),
    Time(f64, String),
    Timestamp(f64, String),
    Interval(f64, String),
    Money(f64, String),
}

/// The calculation projection of a [`QvdValue`]: the basis for ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalcValue<'a> {
    Int(i32),
    Float(f64),
    Str(&'a str),
}

impl QvdValue {
    /// The display projection: the string a human would be shown.
    pub fn display_value(&self) -> String {
        match self {
            QvdValue::Integer(v) => v.to_string(),
            QvdValue::Double(v) => v.to_string(),
            QvdValue::String(v) => v.clone(),
            QvdValue::DualInteger(_, s)
            | QvdValue::DualDouble(_, s)
            | QvdValue::Date(_, s)
            | QvdValue::Time(_, s)
            | QvdValue::Timestamp(_, s)
            | QvdValue::Interval(_, s)
            | QvdValue::Money(_, s) => s.clone(),
        }
    }

    /// The calculation projection: the basis for ordering.
    pub fn calculation_value(&self) -> CalcValue<'_> {
        match self {
            QvdValue::Integer(v) => CalcValue::Int(*v),
            QvdValue::Double(v) => CalcValue::Float(*v),
            QvdValue::String(v) => CalcValue::Str(v),
            QvdValue::DualInteger(v, _) => CalcValue::Int(*v),
            QvdValue::Date(v, _) => CalcValue::Int(*v),
            QvdValue::DualDouble(v, _)
            | QvdValue::Time(v, _)
            | QvdValue::Timestamp(v, _)
            | QvdValue::Interval(v, _)
            | QvdValue::Money(v, _) => CalcValue::Float(*v),
        }
    }

    /// The canonical byte encoding: tag byte followed by the variant's
    /// payload (§4.1). This is the basis for [`PartialEq`] and [`Hash`], and
    /// for symbol deduplication during writing.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            QvdValue::Integer(v) => {
                out.push(TAG_INTEGER);
                out.write_i32::<LittleEndian>(*v).unwrap();
            }
            QvdValue::Double(v) => {
                out.push(TAG_DOUBLE);
                out.write_f64::<LittleEndian>(*v).unwrap();
            }
            QvdValue::String(v) => {
                out.push(TAG_STRING);
                out.extend_from_slice(v.as_bytes());
                out.push(0);
            }
            QvdValue::DualInteger(i, s) | QvdValue::Date(i, s) => {
                out.push(TAG_DUAL_INTEGER);
                out.write_i32::<LittleEndian>(*i).unwrap();
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
            QvdValue::DualDouble(d, s)
            | QvdValue::Time(d, s)
            | QvdValue::Timestamp(d, s)
            | QvdValue::Interval(d, s)
            | QvdValue::Money(d, s) => {
                out.push(TAG_DUAL_DOUBLE);
                out.write_f64::<LittleEndian>(*d).unwrap();
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
        out
    }

    /// Decode one symbol from `reader`, given the tag byte already read and
    /// the owning field's declared type (used to disambiguate `0x05`/`0x06`
    /// dual payloads into `Date`/`Time`/`Timestamp`/`Interval`/`Money`).
    pub fn decode<R: Read>(tag: u8, reader: &mut R, field_type: FieldType) -> Result<Self, QvdError> {
        match tag {
            TAG_INTEGER => Ok(QvdValue::Integer(reader.read_i32::<LittleEndian>()?)),
            TAG_DOUBLE => Ok(QvdValue::Double(reader.read_f64::<LittleEndian>()?)),
            TAG_STRING => Ok(QvdValue::String(read_nul_terminated(reader)?)),
            TAG_DUAL_INTEGER => {
                let int_value = reader.read_i32::<LittleEndian>()?;
                let string_value = read_nul_terminated(reader)?;
                Ok(match field_type {
                    FieldType::Date => QvdValue::Date(int_value, string_value),
                    _ => QvdValue::DualInteger(int_value, string_value),
                })
            }
            TAG_DUAL_DOUBLE => {
                let double_value = reader.read_f64::<LittleEndian>()?;
                let string_value = read_nul_terminated(reader)?;
                Ok(match field_type {
                    FieldType::Timestamp => QvdValue::Timestamp(double_value, string_value),
                    FieldType::Time => QvdValue::Time(double_value, string_value),
                    FieldType::Interval => QvdValue::Interval(double_value, string_value),
                    FieldType::Money => QvdValue::Money(double_value, string_value),
                    _ => QvdValue::DualDouble(double_value, string_value),
                })
            }
            other => Err(QvdError::UnknownSymbolTag(other)),
        }
    }
}

fn read_nul_terminated<R: Read>(reader: &mut R) -> Result<String, QvdError> {
    let mut bytes = Vec::new();
    loop {
        let byte = reader.read_u8()?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8(bytes).map_err(|e| QvdError::InvalidEncoding(e.to_string()))
}

impl PartialEq for QvdValue {
    fn eq(&self, other: &Self) -> bool {
        self.encode() == other.encode()
    }
}

impl Eq for QvdValue {}

impl Hash for QvdValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encode().hash(state);
    }
}

/// Epoch anchor for [`QvdValue::Date`]/`Time`/`Timestamp`/`Interval`
/// calculation values: day 0 is 1899-12-30.
pub const EPOCH_DAYS_FROM_CE: i32 = 693593;

/// Compares the calculation projections of two optional cells, with `None`
/// (null) sorting after every `Some` value.
pub fn calc_cmp(a: Option<&QvdValue>, b: Option<&QvdValue>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.calculation_value(), b.calculation_value()) {
            (CalcValue::Int(a), CalcValue::Int(b)) => a.cmp(&b),
            (CalcValue::Float(a), CalcValue::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (CalcValue::Str(a), CalcValue::Str(b)) => a.cmp(b),
            (CalcValue::Int(a), CalcValue::Float(b)) => (a as f64).partial_cmp(&b).unwrap_or(Ordering::Equal),
            (CalcValue::Float(a), CalcValue::Int(b)) => a.partial_cmp(&(b as f64)).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}
