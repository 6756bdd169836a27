//! Benchmarks for report assembly and export.
//!
//! Run with: cargo bench

use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use dossier::export::{EpubExporter, HtmlExporter};
use dossier::{AssemblyConfig, Assembler, Exporter, Report, ReportPlan, SectionRecord};

const SHOWCASE: &str = include_str!("../tests/fixtures/showcase.json");

/// The showcase sections repeated into a report of roughly 180 sections.
fn large_plan() -> Vec<SectionRecord> {
    let plan = ReportPlan::from_json(SHOWCASE).unwrap();
    (0..10).flat_map(|_| plan.sections.iter().cloned()).collect()
}

// ============================================================================
// Assembly Benchmarks
// ============================================================================

fn bench_assemble_showcase(c: &mut Criterion) {
    let plan = ReportPlan::from_json(SHOWCASE).unwrap();
    let assembler = Assembler::new();
    c.bench_function("assemble_showcase", |b| {
        b.iter(|| assembler.assemble(&plan.sections).unwrap());
    });
}

fn bench_assemble_large_parallel(c: &mut Criterion) {
    let sections = large_plan();
    let assembler = Assembler::new();
    c.bench_function("assemble_large_parallel", |b| {
        b.iter(|| assembler.assemble(&sections).unwrap());
    });
}

fn bench_assemble_large_sequential(c: &mut Criterion) {
    let sections = large_plan();
    let assembler =
        Assembler::new().with_config(AssemblyConfig::default().with_parallel(false));
    c.bench_function("assemble_large_sequential", |b| {
        b.iter(|| assembler.assemble(&sections).unwrap());
    });
}

// ============================================================================
// Export Benchmarks
// ============================================================================

fn showcase_report() -> Report {
    let plan = ReportPlan::from_json(SHOWCASE).unwrap();
    let document = Assembler::new().assemble(&plan.sections).unwrap();
    Report::new(plan.meta, document)
}

fn bench_export_html(c: &mut Criterion) {
    let report = showcase_report();
    let exporter = HtmlExporter::new();
    c.bench_function("export_html", |b| {
        b.iter(|| {
            let mut out = Cursor::new(Vec::new());
            exporter.export(&report, &mut out).unwrap();
            out
        });
    });
}

fn bench_export_epub(c: &mut Criterion) {
    let report = showcase_report();
    let exporter = EpubExporter::new();
    c.bench_function("export_epub", |b| {
        b.iter(|| {
            let mut out = Cursor::new(Vec::new());
            exporter.export(&report, &mut out).unwrap();
            out
        });
    });
}

criterion_group!(
    benches,
    bench_assemble_showcase,
    bench_assemble_large_parallel,
    bench_assemble_large_sequential,
    bench_export_html,
    bench_export_epub,
);
criterion_main!(benches);
