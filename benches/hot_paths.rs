//! Criterion benchmarks for distshape hot paths
//!
//! Benchmarks the per-file operations that run once for every emitted
//! file:
//! - Rewrite: relative require target rewriting
//! - Patch: version placeholder stamping
//! - Minify: whitespace and comment stripping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use distshape::minify::minify_js;
use distshape::rewrite::RequireRewriter;
use std::path::Path;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate a compiled module with n relative require calls.
fn make_module_source(requires: usize) -> String {
    let mut out = String::from("\"use strict\";\nObject.defineProperty(exports, \"__esModule\", { value: true });\n");
    for i in 0..requires {
        out.push_str(&format!("const dep{} = require(\"./dep{}\");\n", i, i));
        out.push_str(&format!("exports.dep{} = dep{};\n", i, i));
    }
    out
}

/// Generate bundle-sized text with a placeholder every 50 lines.
fn make_bundle_text(lines: usize) -> String {
    let mut out = String::new();
    for i in 0..lines {
        if i % 50 == 0 {
            out.push_str("const VERSION = \"##VERSION##\";\n");
        } else {
            out.push_str(&format!("function chunk{}(m) {{ return m * {}; }}\n", i, i));
        }
    }
    out
}

/// Generate readable source with the comment density of hand-written code.
fn make_readable_source(lines: usize) -> String {
    let mut out = String::new();
    for i in 0..lines {
        match i % 4 {
            0 => out.push_str(&format!("// helper number {}\n", i)),
            1 => out.push_str(&format!("export function helper{}(x) {{\n", i)),
            2 => out.push_str(&format!("    return x + {};\n}}\n", i)),
            _ => out.push('\n'),
        }
    }
    out
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");

    let rewriter = RequireRewriter::new(
        "/project/src".into(),
        "/project/lib".into(),
        "ts",
        "cjs",
        |_: &Path| true,
    );
    let compiled = Path::new("/project/lib/index.cjs");

    for requires in &[4usize, 32, 128] {
        let source = make_module_source(*requires);
        group.throughput(Throughput::Elements(*requires as u64));
        group.bench_with_input(BenchmarkId::new("rewrite_source", requires), &source, |b, source| {
            b.iter(|| rewriter.rewrite_source(compiled, black_box(source)).unwrap())
        });
    }

    group.finish();
}

fn bench_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch");

    for lines in &[100usize, 1_000, 10_000] {
        let text = make_bundle_text(*lines);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("stamp_version", lines), &text, |b, text| {
            b.iter(|| black_box(text).replace("##VERSION##", "2.3.1"))
        });
    }

    group.finish();
}

fn bench_minify(c: &mut Criterion) {
    let mut group = c.benchmark_group("minify");

    for lines in &[100usize, 1_000, 10_000] {
        let source = make_readable_source(*lines);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("minify_js", lines), &source, |b, source| {
            b.iter(|| minify_js(black_box(source)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite, bench_patch, bench_minify);
criterion_main!(benches);
