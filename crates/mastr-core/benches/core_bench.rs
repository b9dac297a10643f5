//! Criterion benchmarks for mastr-core DSP primitives
//!
//! Run with: cargo bench -p mastr-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mastr_core::{
    Biquad, Compressor, DelayLine, DualMono, Effect, EnvelopeDetector, Filter, FilterSpec,
    FrameEffect, LinkedCompressor, low_pass, parametric,
};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024, 4096];

fn generate_test_signal(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");

    let coeffs = low_pass(SAMPLE_RATE, 8000.0).unwrap();

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut biquad = Biquad::new(coeffs);
                b.iter(|| {
                    for &sample in &input {
                        black_box(biquad.process(black_box(sample)));
                    }
                });
            },
        );
    }

    // Coefficient calculation cost
    group.bench_function("parametric_design", |b| {
        b.iter(|| {
            black_box(parametric(
                black_box(SAMPLE_RATE),
                black_box(1000.0),
                black_box(-3.0),
                black_box(1.4),
            ))
        });
    });

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("EnvelopeDetector");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("detect_db", block_size),
            &block_size,
            |b, _| {
                let mut env = EnvelopeDetector::new(SAMPLE_RATE, 10.0, 100.0)
                    .unwrap()
                    .with_log_output(true);
                b.iter(|| {
                    for &sample in &input {
                        black_box(env.detect(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("DelayLine");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("fractional", block_size),
            &block_size,
            |b, _| {
                let mut delay = DelayLine::from_time(SAMPLE_RATE, 0.3).unwrap();
                delay.set_delay_ms(2.37).unwrap();
                b.iter(|| {
                    for &sample in &input {
                        black_box(delay.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compressor");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let stereo: Vec<f64> = input.iter().flat_map(|&x| [x, -x]).collect();

        group.bench_with_input(
            BenchmarkId::new("mono", block_size),
            &block_size,
            |b, _| {
                let mut comp = Compressor::new(SAMPLE_RATE).unwrap();
                comp.set_knee_db(6.0).unwrap();
                comp.set_lookahead_ms(2.0).unwrap();
                let mut buffer = input.clone();
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    comp.process_block_inplace(black_box(&mut buffer));
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("linked_stereo", block_size),
            &block_size,
            |b, _| {
                let mut comp = Compressor::new(SAMPLE_RATE).unwrap();
                comp.set_knee_db(6.0).unwrap();
                comp.set_lookahead_ms(2.0).unwrap();
                let mut linked = LinkedCompressor::new(comp, 2);
                let mut buffer = stereo.clone();
                b.iter(|| {
                    buffer.copy_from_slice(&stereo);
                    linked.process_interleaved(black_box(&mut buffer), 2);
                });
            },
        );
    }

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("Chain");

    let input = generate_test_signal(4096);
    let stereo: Vec<f64> = input.iter().flat_map(|&x| [x, x]).collect();

    group.bench_function("hpf_eq_comp_stereo_4096", |b| {
        let mut stages: Vec<Box<dyn FrameEffect>> = vec![
            Box::new(DualMono::new(
                Filter::new(FilterSpec::HighPass { freq: 40.0 }, SAMPLE_RATE).unwrap(),
                2,
            )),
            Box::new(DualMono::new(
                Filter::new(
                    FilterSpec::Parametric {
                        freq: 3000.0,
                        gain_db: -2.0,
                        q: 1.4,
                    },
                    SAMPLE_RATE,
                )
                .unwrap(),
                2,
            )),
            Box::new(LinkedCompressor::new(Compressor::new(SAMPLE_RATE).unwrap(), 2)),
        ];
        let mut buffer = stereo.clone();
        b.iter(|| {
            buffer.copy_from_slice(&stereo);
            for stage in &mut stages {
                stage.process_interleaved(black_box(&mut buffer), 2);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_biquad,
    bench_envelope,
    bench_delay,
    bench_compressor,
    bench_chain,
);
criterion_main!(benches);
