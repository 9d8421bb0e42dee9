//! Criterion benchmark for first-line stage classification.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use omicron_build_core::stage::{classify_line, read_first_line};

fn bench_classify(c: &mut Criterion) {
    let unmarked = "#version 450 core // no marker on this line, every stage is checked";
    let compute = "// OMICRON_COMP local_size_x = 64";
    let source = format!("{compute}\nlayout(local_size_x = 64) in;\nvoid main() {{}}\n");

    c.bench_function("classify_line unmarked", |b| {
        b.iter(|| classify_line(black_box(unmarked)))
    });

    c.bench_function("classify_line compute", |b| {
        b.iter(|| classify_line(black_box(compute)))
    });

    c.bench_function("read_first_line + classify", |b| {
        b.iter(|| {
            let line = read_first_line(Cursor::new(black_box(source.as_bytes()))).unwrap();
            classify_line(&line)
        })
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
