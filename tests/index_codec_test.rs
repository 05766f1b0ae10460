//! Scenarios from the index codec's worked examples: packed field layout
//! and null biasing.

use qvd::index::{decode_index_region, encode_record};
use qvd::writer::{write_table, WriteOptions};
use qvd::{read_table, QvdTable, QvdValue};

fn field(bit_offset: u32, bit_width: u32, bias: i32) -> qvd::header::QvdFieldHeader {
    let mut f = qvd::header::QvdFieldHeader::default();
    f.field_name = "f".to_string();
    f.bit_offset = bit_offset;
    f.bit_width = bit_width;
    f.bias = bias;
    f
}

#[test]
fn three_column_layout_decodes_each_row_back_to_its_symbol_indices() {
    // columns A=[1,2,3], B=[4,6], C=[7,8,9]; row (2,6,9) encodes to
    // indices (1,1,2) with widths 2,1,2.
    let fields = vec![field(0, 2, 0), field(2, 1, 0), field(3, 2, 0)];
    let record_byte_size = 1;
    let raw = [1u64, 1, 2];
    let encoded = encode_record(&raw, &fields, record_byte_size);
    let decoded = decode_index_region(&encoded, &fields, 1, record_byte_size as u64).unwrap();
    assert_eq!(decoded[0], vec![1i64, 1, 2]);
}

#[test]
fn null_round_trip_preserves_raw_sequence_and_bias() {
    let columns = vec!["v".to_string()];
    let data: Vec<Vec<Option<QvdValue>>> = vec![10, -1, 10, 20, -1]
        .into_iter()
        .map(|n| vec![if n < 0 { None } else { Some(QvdValue::Integer(n)) }])
        .collect();
    let table = QvdTable::new(columns, data).unwrap();

    let mut bytes = Vec::new();
    write_table(&mut bytes, &table, &WriteOptions::default()).unwrap();
    let read_back = read_table(std::io::Cursor::new(&bytes)).unwrap();

    assert_eq!(read_back.get_column("v").unwrap(), table.get_column("v").unwrap());
}

#[test]
fn dual_values_with_same_calc_but_different_display_stay_distinct_symbols() {
    let columns = vec!["v".to_string()];
    let data = vec![
        vec![Some(QvdValue::DualInteger(1, "one".to_string()))],
        vec![Some(QvdValue::DualInteger(1, "uno".to_string()))],
    ];
    let table = QvdTable::new(columns, data).unwrap();

    let mut bytes = Vec::new();
    write_table(&mut bytes, &table, &WriteOptions::default()).unwrap();
    let read_back = read_table(std::io::Cursor::new(&bytes)).unwrap();

    assert_eq!(read_back.rows()[0], table.rows()[0]);
    assert_eq!(read_back.rows()[1], table.rows()[1]);
    assert_ne!(read_back.rows()[0], read_back.rows()[1]);
}
