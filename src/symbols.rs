//! Symbol table codec (C4): one column's distinct-value region.

use std::collections::HashMap;
use std::io::Cursor;

use byteorder::ReadBytesExt;

use crate::header::QvdFieldHeader;
use crate::value::QvdValue;
use crate::QvdError;

/// Decode all symbols belonging to one field from the symbol region.
///
/// The sequence position of a decoded symbol within the column fixes its
/// 0-based index, which the index table later references.
pub fn decode_field_symbols(
    symbol_region: &[u8],
    field: &QvdFieldHeader,
) -> Result<Vec<QvdValue>, QvdError> {
    let start = field.offset as usize;
    let end = start
        .checked_add(field.length as usize)
        .ok_or(QvdError::Truncated {
            region: "symbol table",
            expected: usize::MAX,
            found: symbol_region.len(),
        })?;
    if end > symbol_region.len() {
        return Err(QvdError::Truncated {
            region: "symbol table",
            expected: end,
            found: symbol_region.len(),
        });
    }

    let slice = &symbol_region[start..end];
    let mut cursor = Cursor::new(slice);
    let mut symbols = Vec::with_capacity(field.no_of_symbols as usize);

    while (cursor.position() as usize) < slice.len() {
        let tag = cursor.read_u8()?;
        symbols.push(QvdValue::decode(tag, &mut cursor, field.number_format.type_)?);
    }

    Ok(symbols)
}

/// Deduplicate a column's non-null values in first-seen order, returning
/// the distinct symbols and a lookup from value to its 0-based symbol
/// index. Equality is the canonical-bytes equality of [`QvdValue`]; two
/// values with the same calculation projection but a different display
/// string are distinct symbols.
pub fn dedupe_column<'a, I>(values: I) -> (Vec<QvdValue>, HashMap<QvdValue, usize>, bool)
where
    I: IntoIterator<Item = &'a Option<QvdValue>>,
{
    let mut symbols = Vec::new();
    let mut index = HashMap::new();
    let mut contains_null = false;

    for value in values {
        match value {
            None => contains_null = true,
            Some(v) => {
                if !index.contains_key(v) {
                    index.insert(v.clone(), symbols.len());
                    symbols.push(v.clone());
                }
            }
        }
    }

    (symbols, index, contains_null)
}

/// Encode a column's deduplicated symbols to their canonical byte form and
/// concatenate them, in symbol-index order.
pub fn encode_column_symbols(symbols: &[QvdValue]) -> Vec<u8> {
    let mut out = Vec::new();
    for symbol in symbols {
        out.extend_from_slice(&symbol.encode());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_preserves_first_seen_order_and_skips_nulls() {
        let values: Vec<Option<QvdValue>> = vec![
            Some(QvdValue::Integer(10)),
            None,
            Some(QvdValue::Integer(10)),
            Some(QvdValue::Integer(20)),
            None,
        ];
        let (symbols, index, has_null) = dedupe_column(&values);
        assert_eq!(symbols, vec![QvdValue::Integer(10), QvdValue::Integer(20)]);
        assert_eq!(index[&QvdValue::Integer(10)], 0);
        assert_eq!(index[&QvdValue::Integer(20)], 1);
        assert!(has_null);
    }

    #[test]
    fn dual_values_with_distinct_display_yield_two_symbols() {
        let values: Vec<Option<QvdValue>> = vec![
            Some(QvdValue::DualInteger(1, "one".to_string())),
            Some(QvdValue::DualInteger(1, "uno".to_string())),
        ];
        let (symbols, _, has_null) = dedupe_column(&values);
        assert_eq!(symbols.len(), 2);
        assert!(!has_null);
    }
}
