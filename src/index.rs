//! Index table codec (C5): bit-packed row references into the symbol
//! tables.
//!
//! This is the hardest part of the format. A record's bits pack one index
//! per field, low-bit-first in field order. Records are stored big-endian
//! at the byte level but little-endian at the bit level: the encoder's bit
//! string is split into bytes most-significant-first, then the byte
//! sequence itself is reversed so the least-significant record byte lands
//! at the lower file offset. Decoding inverts this exactly — see
//! [`decode_record`] and [`encode_record`].

use crate::header::QvdFieldHeader;
use crate::QvdError;

/// Decode the whole index region into per-record symbol indices (one
/// `i64` per field; negative means null after bias is applied).
pub fn decode_index_region(
    index_region: &[u8],
    fields: &[QvdFieldHeader],
    no_of_records: u64,
    record_byte_size: u64,
) -> Result<Vec<Vec<i64>>, QvdError> {
    let expected = (no_of_records * record_byte_size) as usize;
    if index_region.len() < expected {
        return Err(QvdError::Truncated {
            region: "index table",
            expected,
            found: index_region.len(),
        });
    }

    let record_byte_size = record_byte_size as usize;
    let mut records = Vec::with_capacity(no_of_records as usize);

    for i in 0..no_of_records as usize {
        let start = i * record_byte_size;
        let end = start + record_byte_size;
        records.push(decode_record(&index_region[start..end], fields)?);
    }

    Ok(records)
}

/// Decode one record's bytes into per-field symbol indices (bias already
/// applied; a negative value means the cell is null).
pub fn decode_record(record_bytes: &[u8], fields: &[QvdFieldHeader]) -> Result<Vec<i64>, QvdError> {
    let mut reversed: Vec<u8> = record_bytes.to_vec();
    reversed.reverse();

    let mut bits = Vec::with_capacity(reversed.len() * 8);
    for byte in &reversed {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits.reverse();

    let mut indices = Vec::with_capacity(fields.len());
    for field in fields {
        let raw: i64 = if field.bit_width == 0 {
            0
        } else {
            let start = field.bit_offset as usize;
            let width = field.bit_width as usize;
            let slice = bits
                .get(start..start + width)
                .ok_or_else(|| QvdError::Truncated {
                    region: "record bits",
                    expected: start + width,
                    found: bits.len(),
                })?;
            bits_to_u64(slice) as i64
        };
        indices.push(raw + field.bias as i64);
    }

    Ok(indices)
}

/// Encode one record from each field's already bias-shifted raw value,
/// given each field's bit offset and width.
pub fn encode_record(raw_values: &[u64], fields: &[QvdFieldHeader], record_byte_size: usize) -> Vec<u8> {
    let total_bits = record_byte_size * 8;
    let mut bits = vec![0u8; total_bits];

    for (raw, field) in raw_values.iter().zip(fields) {
        let width = field.bit_width as usize;
        let offset = field.bit_offset as usize;
        for i in 0..width {
            bits[offset + i] = ((raw >> i) & 1) as u8;
        }
    }

    // Fields are laid out low-bit-first; pack MSB-first per byte, then
    // reverse the byte sequence (see module docs).
    let mut packed = vec![0u8; record_byte_size];
    for (byte_index, slot) in packed.iter_mut().enumerate() {
        let mut byte = 0u8;
        for bit_in_byte in 0..8 {
            // bits[] index counts up from the record's LSB (index 0); the
            // most significant bit of the *last* byte holds the highest
            // record-bit index.
            let record_bit = total_bits - 1 - (byte_index * 8 + bit_in_byte);
            byte = (byte << 1) | bits[record_bit];
        }
        *slot = byte;
    }
    packed.reverse();
    packed
}

/// The minimal number of bits needed to represent `value` as an unsigned
/// integer; `0` for the value `0` itself (a column whose every raw value is
/// `0` — the single-symbol, non-nullable case — needs no bits at all).
pub fn bits_needed(value: u64) -> u32 {
    if value == 0 {
        0
    } else {
        64 - value.leading_zeros()
    }
}

fn bits_to_u64(bits: &[u8]) -> u64 {
    bits.iter()
        .enumerate()
        .fold(0u64, |acc, (i, &bit)| acc | ((bit as u64) << i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::NumberFormat;

    fn field(bit_offset: u32, bit_width: u32, bias: i32) -> QvdFieldHeader {
        QvdFieldHeader {
            field_name: String::new(),
            bit_offset,
            bit_width,
            bias,
            number_format: NumberFormat::default(),
            no_of_symbols: 0,
            offset: 0,
            length: 0,
            comment: String::new(),
            ..Default::default()
        }
    }

    #[test]
    fn bits_needed_matches_boundary_cases() {
        assert_eq!(bits_needed(0), 0);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(2), 2);
        assert_eq!(bits_needed(3), 2);
        assert_eq!(bits_needed(4), 3);
    }

    /// Three columns packed into a single byte: A (width 2), B (width 1,
    /// offset 2), C (width 2, offset 3), with raw indices (1, 1, 2).
    #[test]
    fn three_column_packed_layout_worked_example() {
        let fields = vec![field(0, 2, 0), field(2, 1, 0), field(3, 2, 0)];
        let raw = vec![1u64, 1, 2];
        let bytes = encode_record(&raw, &fields, 1);
        assert_eq!(bytes, vec![0b0001_0101]);

        let decoded = decode_record(&bytes, &fields).unwrap();
        assert_eq!(decoded, vec![1, 1, 2]);
    }

    #[test]
    fn width_zero_field_always_decodes_to_zero() {
        let fields = vec![field(0, 0, 0)];
        let decoded = decode_record(&[], &fields).unwrap();
        assert_eq!(decoded, vec![0]);
    }

    #[test]
    fn bit_width_crossing_byte_boundary() {
        // 5 bits starting at bit 6, spanning two bytes.
        let fields = vec![field(0, 6, 0), field(6, 5, 0)];
        let raw = vec![0u64, 0b10101];
        let bytes = encode_record(&raw, &fields, 2);
        let decoded = decode_record(&bytes, &fields).unwrap();
        assert_eq!(decoded, vec![0, 0b10101]);
    }

    #[test]
    fn nullable_bias_roundtrip() {
        // bias -2: raw 0 -> null, raw 2.. -> real symbol index.
        let fields = vec![field(0, 2, -2)];
        for raw in [0u64, 2, 3] {
            let bytes = encode_record(&[raw], &fields, 1);
            let decoded = decode_record(&bytes, &fields).unwrap();
            assert_eq!(decoded[0], raw as i64 - 2);
        }
    }

    #[test]
    fn truncated_index_region_is_fatal() {
        let fields = vec![field(0, 8, 0)];
        let err = decode_index_region(&[0u8; 2], &fields, 3, 1).unwrap_err();
        assert!(matches!(err, QvdError::Truncated { .. }));
    }
}
