//! Benchmarks for the call-graph build pass.
//!
//! Run with: cargo bench --bench pipeline_benchmarks

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use layergraph::config::AnalysisConfig;
use layergraph::parsing::TreeSitterParser;
use layergraph::Pipeline;
use tempfile::tempdir;

fn write_files(dir: &Path, files: &[(String, String)]) {
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn generate_test_files(file_count: usize, functions_per_file: usize) -> Vec<(String, String)> {
    (0..file_count)
        .map(|i| {
            let file_path = format!("module_{i}.ts");
            let content: String = (0..functions_per_file)
                .map(|j| format!("export function func_{i}_{j}() {{}}\n"))
                .collect();
            (file_path, content)
        })
        .collect()
}

/// Each file imports and calls into the previous one, forcing the
/// call-graph builder's cross-file resolution pass to do real work.
fn generate_interconnected_files(file_count: usize) -> Vec<(String, String)> {
    (0..file_count)
        .map(|i| {
            let file_path = format!("module_{i}.ts");
            let import = if i > 0 {
                format!("import {{ func_{prev} }} from './module_{prev}';\n", prev = i - 1)
            } else {
                String::new()
            };
            let call = if i > 0 { format!("func_{}();\n", i - 1) } else { String::new() };
            let content = format!("{import}export function func_{i}() {{ {call} }}\n");
            (file_path, content)
        })
        .collect()
}

fn bench_build_call_graph_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_call_graph_batch");

    for (file_count, funcs_per_file) in [(10, 10), (50, 10), (100, 10), (10, 50)] {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &generate_test_files(file_count, funcs_per_file));
        let total_elements = (file_count * funcs_per_file) as u64;
        group.throughput(Throughput::Elements(total_elements));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{file_count}files_{funcs_per_file}funcs")),
            &dir,
            |b, dir| {
                let parser = TreeSitterParser::new();
                let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
                b.iter(|| pipeline.build_call_graph(black_box(dir.path()), "bench"));
            },
        );
    }

    group.finish();
}

fn bench_cross_file_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_file_resolution");

    for file_count in [10, 50, 100] {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &generate_interconnected_files(file_count));
        group.throughput(Throughput::Elements(file_count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{file_count}_files")), &dir, |b, dir| {
            let parser = TreeSitterParser::new();
            let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
            b.iter(|| pipeline.build_call_graph(black_box(dir.path()), "bench"));
        });
    }

    group.finish();
}

fn bench_file_size_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_call_graph_file_size");

    for lines_per_file in [100, 500, 1000, 2000] {
        let dir = tempdir().unwrap();
        let content: String = (0..lines_per_file).map(|i| format!("export function func_{i}() {{}}\n")).collect();
        fs::write(dir.path().join("large_file.ts"), content).unwrap();
        group.throughput(Throughput::Elements(lines_per_file as u64));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{lines_per_file}_lines")), &dir, |b, dir| {
            let parser = TreeSitterParser::new();
            let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
            b.iter(|| pipeline.build_call_graph(black_box(dir.path()), "bench"));
        });
    }

    group.finish();
}

/// Full analyze-one-function path (A->E->F->G) on a single realistic
/// function, to separate CFG/DFG/PDG cost from the call-graph build pass.
fn bench_analyze_function(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("svc.ts"),
        "export function process(items: number[]): number {\n\
         let total = 0;\n\
         for (const item of items) {\n\
         if (item > 0) { total += item; } else { total -= item; }\n\
         }\n\
         return total;\n\
         }\n",
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
    let report = pipeline.build_call_graph(dir.path(), "bench");
    let loc = report.graph.functions.get("svc.process").unwrap().clone();

    c.bench_function("analyze_function_cfg_dfg_pdg", |b| {
        b.iter(|| pipeline.analyze_function(black_box(dir.path()), black_box(&loc)));
    });
}

criterion_group!(
    benches,
    bench_build_call_graph_batch,
    bench_cross_file_resolution,
    bench_file_size_impact,
    bench_analyze_function,
);

criterion_main!(benches);
