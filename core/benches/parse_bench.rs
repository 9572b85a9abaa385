use criterion::{Criterion, criterion_group, criterion_main};
use lunar_core::{GlobalScope, analyze, token::Tokenizer};
use std::hint::black_box;

fn module_source(functions: usize) -> String {
    let mut src = String::from("local M = {}\n\n");
    for i in 0..functions {
        src.push_str(&format!(
            "-- Adds {i} to n\n-- @param n number\n-- @return number\nfunction M.add{i}(n)\n  local r = n + {i}\n  if r > 10 then\n    return r\n  end\n  return 0\nend\n\n"
        ));
    }
    src.push_str("return M\n");
    src
}

fn bench_tokenize(c: &mut Criterion) {
    let src = module_source(200);
    c.bench_function("tokenize_200_functions", |b| {
        b.iter(|| {
            let stream = Tokenizer::tokenize(black_box(&src));
            black_box(stream.tokens.len());
        })
    });
}

fn bench_analyze(c: &mut Criterion) {
    let src = module_source(200);
    c.bench_function("analyze_200_functions", |b| {
        b.iter(|| {
            let mut global = GlobalScope::new();
            let analysis = analyze(black_box(&src), &mut global, Some("file:///bench.lua"));
            black_box(analysis.scopes().len());
        })
    });

    let mut global = GlobalScope::new();
    let analysis = analyze(&src, &mut global, None);
    c.bench_function("scope_at_lookup", |b| {
        b.iter(|| {
            for line in (0..2000).step_by(37) {
                black_box(analysis.scope_at(line));
            }
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_analyze);
criterion_main!(benches);
