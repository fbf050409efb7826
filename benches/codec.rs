extern crate criterion;
extern crate lzstring;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn corpus(name: &str) -> Vec<u16> {
    let text = match name {
        "source" => include_str!("../src/lib.rs").repeat(16),
        "json" => r#"{"alwaysDash":true,"commandRemember":false,"bgmVolume":30,"bgsVolume":60}"#.repeat(256),
        "japanese" => "で、適当に日本語入れて正しく出るか見ればいいってことでしょ？".repeat(256),
        _ => unreachable!("unknown corpus"),
    };
    text.encode_utf16().collect()
}

pub fn criterion_benchmark(c: &mut Criterion, name: &str) {
    let data = corpus(name);
    let packed = lzstring::compress(&data);

    let mut group = c.benchmark_group(name);
    group.throughput(Throughput::Bytes(2 * data.len() as u64));
    group.bench_with_input(BenchmarkId::new("compress", data.len()), &data, |b, data| {
        b.iter(|| black_box(lzstring::compress(data)))
    });
    group.bench_with_input(BenchmarkId::new("decompress", packed.len()), &packed, |b, packed| {
        b.iter(|| black_box(lzstring::decompress(packed).expect("Error")))
    });
    group.finish();
}

pub fn bench_source(c: &mut Criterion) {
    criterion_benchmark(c, "source");
}

pub fn bench_json(c: &mut Criterion) {
    criterion_benchmark(c, "json");
}

pub fn bench_japanese(c: &mut Criterion) {
    criterion_benchmark(c, "japanese");
}

criterion_group!(benches, bench_source, bench_json, bench_japanese);
criterion_main!(benches);
