use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markweave_engine::{ParseOptions, Parser};
mod common;

fn bench_pulldown_cmark_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    group.bench_function("pulldown_cmark", |b| {
        b.iter(|| {
            let parser = pulldown_cmark::Parser::new_ext(
                std::hint::black_box(&content),
                pulldown_cmark::Options::ENABLE_TABLES
                    | pulldown_cmark::Options::ENABLE_STRIKETHROUGH
                    | pulldown_cmark::Options::ENABLE_TASKLISTS,
            );
            let events: Vec<_> = parser.collect();
            std::hint::black_box(events);
        });
    });

    let parser = Parser::gfm().expect("gfm registry builds");
    let options = ParseOptions::default();
    group.bench_function("markweave", |b| {
        b.iter(|| {
            let root = parser.parse(std::hint::black_box(&content), &options);
            std::hint::black_box(root)
        });
    });

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(10);

    let parser = Parser::gfm().expect("gfm registry builds");
    let options = ParseOptions {
        reserve_position: false,
    };
    for n in [1_000, 4_000] {
        for (name, input) in common::pathological_inputs(n) {
            group.bench_with_input(BenchmarkId::new(name, n), &input, |b, input| {
                b.iter(|| std::hint::black_box(parser.parse(input, &options)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pulldown_cmark_baseline, bench_pathological);
criterion_main!(benches);
