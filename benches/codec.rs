use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use qvd::{read_table, write_table, QvdTable, QvdValue, WriteOptions};

fn sample_table(rows: usize) -> QvdTable {
    let columns = vec!["id".to_string(), "name".to_string(), "score".to_string()];
    let data = (0..rows)
        .map(|i| {
            vec![
                Some(QvdValue::Integer(i as i32)),
                Some(QvdValue::String(format!("row-{}", i % 50))),
                if i % 7 == 0 {
                    None
                } else {
                    Some(QvdValue::Double(i as f64 * 1.5))
                },
            ]
        })
        .collect();
    QvdTable::new(columns, data).unwrap()
}

fn bench_write(c: &mut Criterion) {
    let table = sample_table(10_000);
    c.bench_function("write_table/10k_rows", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            write_table(&mut buf, black_box(&table), &WriteOptions::default()).unwrap();
            buf
        })
    });
}

fn bench_read(c: &mut Criterion) {
    let table = sample_table(10_000);
    let mut buf = Vec::new();
    write_table(&mut buf, &table, &WriteOptions::default()).unwrap();

    c.bench_function("read_table/10k_rows", |b| {
        b.iter(|| read_table(std::io::Cursor::new(black_box(&buf))).unwrap())
    });
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
