//! Fingerprint performance benchmarks
//!
//! Measures signature extraction over synthetic bundles of various sizes and
//! corpus ranking with and without the candidate filter.
//!
//! Run with: cargo bench --bench fingerprint

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use jsfinger::{
    extract_signature, parse_source, rank, ExtractOptions, Lang, LibraryCorpus, LibraryId,
    RankOptions, Signature, Strategy,
};

/// Build a minified-looking bundle with `functions` small modules
fn synthetic_bundle(functions: usize, seed: usize) -> String {
    let mut source = String::from("!function(){'use strict';");
    for i in 0..functions {
        source.push_str(&format!(
            "var f{i}=function(a,b){{if(a===\"k{seed}_{i}\"){{return b+{n}}}for(var i=0;i<a.length;i++){{b.push(a[i])}}return function(){{return b.map(function(x){{return x*{n}}})}}}};",
            i = i,
            seed = seed,
            n = 100 + i
        ));
    }
    source.push_str("}();");
    source
}

fn extract(source: &str) -> Signature {
    let unit = parse_source(source, Lang::JavaScript).expect("parse");
    extract_signature(&unit, &ExtractOptions::default()).expect("extract")
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for size in [10, 100, 1000] {
        let source = synthetic_bundle(size, 0);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| extract(black_box(source)))
        });
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let corpus = LibraryCorpus::from_entries(
        (0..200).map(|i| (LibraryId::new(format!("lib{}", i), "1.0.0"), extract(&synthetic_bundle(20, i)))),
    );
    let unknown = extract(&synthetic_bundle(20, 7));

    let mut group = c.benchmark_group("ranking");
    for (label, use_candidate_filter) in [("filtered", true), ("full", false)] {
        let options = RankOptions {
            use_candidate_filter,
            ..RankOptions::default()
        };
        group.bench_function(label, |b| {
            b.iter(|| rank(black_box(&unknown), &corpus, Strategy::default(), &options))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_ranking);
criterion_main!(benches);
