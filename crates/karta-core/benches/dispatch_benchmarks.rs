//! Benchmarks for candidate selection
//!
//! Selection runs on every step of every request since nothing is cached,
//! so it has to stay cheap as registries grow.
//!
//! Copyright (c) 2025 Karta Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use karta_core::representation::contrast;
use karta_core::{
    Charset, Encoding, Format, Kernel, Operator, OperatorCategory, OperatorDescriptor, Parser,
    Registry, Representation,
};
use std::sync::Arc;

struct Inert(OperatorDescriptor);

impl Operator for Inert {
    fn descriptor(&self) -> &OperatorDescriptor {
        &self.0
    }
}

impl Parser for Inert {}

fn language(i: usize) -> String {
    format!("language-{}", i % 8)
}

fn full(language: &str, format: Format) -> Representation {
    Representation::of(language)
        .with_serialization(format!("{}+{}", language, format))
        .with_format(format)
        .with_charset(Charset::utf_8())
        .with_encoding(Encoding::Identity)
}

fn registry(size: usize) -> Registry {
    (0..size)
        .fold(Registry::builder(), |builder, i| {
            let lang = language(i);
            let descriptor = OperatorDescriptor::new(format!("parser-{}", i), OperatorCategory::Parser)
                .for_language(lang.as_str())
                .accepting([Representation::of(lang.as_str())])
                .producing([
                    Representation::of(lang.as_str()),
                    full(&lang, Format::Json),
                    full(&lang, Format::Yaml),
                ]);
            builder.with_parser(Inert(descriptor))
        })
        .build()
}

fn bench_contrast(c: &mut Criterion) {
    let requested = Representation::of("language-0").with_format(Format::Json);
    let candidate = full("language-0", Format::Json).with_lexicon("snomed");
    c.bench_function("contrast_narrower", |b| {
        b.iter(|| contrast(black_box(&requested), black_box(&candidate)))
    });
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_candidates");
    let source = full("language-3", Format::Json);
    let hint = Representation::of("language-3").with_format(Format::Json);

    for size in [8, 64, 512] {
        let kernel = Kernel::new(Arc::new(registry(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &kernel, |b, kernel| {
            b.iter(|| kernel.parser_candidates(black_box(&source), black_box(&hint)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contrast, bench_selection);
criterion_main!(benches);
