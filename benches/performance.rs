//! Performance benchmarks for the speed test simulator
//!
//! Covers the per-tick hot path (interpolation), rendering of the result
//! card and chart, and configuration parsing.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pingpanic::{
    cli::Cli,
    config::parser::ConfigParser,
    models::{RunReport, SamplePoint, TestOutcome, UserInfo},
    output::OutputFormatterFactory,
    servers::find_server,
    simulation::interpolate,
    types::Phase,
    Config,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::time::Duration;

/// Samples as one download and one upload phase would produce them
fn create_sample_log(per_phase: usize) -> Vec<SamplePoint> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut samples = Vec::with_capacity(per_phase * 2);
    for (phase, ceiling) in [(Phase::Download, 320.0), (Phase::Upload, 64.0)] {
        for i in 1..=per_phase {
            let progress = i as f64 / per_phase as f64;
            samples.push(SamplePoint::new(
                phase,
                Duration::from_millis(i as u64 * 150),
                interpolate(progress, ceiling, rng.gen()),
            ));
        }
    }
    samples
}

fn benchmark_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation");

    group.bench_function("ramp_sample", |b| {
        b.iter(|| interpolate(black_box(0.1), black_box(400.0), black_box(0.73)))
    });

    group.bench_function("plateau_sample", |b| {
        b.iter(|| interpolate(black_box(0.8), black_box(400.0), black_box(0.21)))
    });

    group.bench_function("full_phase_with_rng", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            let mut last = 0.0;
            for i in 1..=53 {
                last = interpolate(i as f64 / 53.0, 250.0, rng.gen());
            }
            black_box(last)
        })
    });

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    for &per_phase in &[53usize, 500, 4000] {
        let report = RunReport {
            run: 1,
            outcome: TestOutcome::new(320.0, 64.0, 18.0),
            user_info: UserInfo::unavailable(),
            server: find_server(1).expect("catalog has server 1"),
            samples: create_sample_log(per_phase),
        };

        for (name, color) in [("plain", false), ("colored", true)] {
            let formatter = OutputFormatterFactory::create_formatter(color, false);
            group.bench_with_input(
                BenchmarkId::new(format!("chart_{}", name), per_phase),
                &report,
                |b, report| b.iter(|| formatter.format_chart(black_box(&report.samples))),
            );
        }

        let formatter = OutputFormatterFactory::create_plain_formatter();
        group.bench_with_input(BenchmarkId::new("report_card", per_phase), &report, |b, report| {
            b.iter(|| formatter.format_report(black_box(report)))
        });
    }

    group.finish();
}

fn benchmark_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parsing");

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| {
            Cli::parse_from(black_box([
                "pingpanic", "--server", "3", "--runs", "2", "--download-ms", "2000", "--json",
            ]))
        })
    });

    group.bench_function("validate_config", |b| {
        let config = Config::default();
        b.iter(|| black_box(&config).validate())
    });

    group.bench_function("layered_parse", |b| {
        let cli = Cli::parse_from(["pingpanic", "--tick-ms", "100"]);
        let parser = ConfigParser::new(cli);
        b.iter(|| {
            parser.parse_with_lookup(|key| match key {
                "DOWNLOAD_DURATION_MS" => Some("4000".to_string()),
                "SERVER_ID" => Some("2".to_string()),
                _ => None,
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_interpolation,
    benchmark_rendering,
    benchmark_config_parsing
);
criterion_main!(benches);
