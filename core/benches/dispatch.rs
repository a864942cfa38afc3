//! Benchmarks for instruction dispatch and loading.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. dispatch: a countdown loop, pre-loaded, so only the step loop is measured
//! 2. load: parsing a straight-line program of the same size

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use linevm_core::{
    api::ExecutionOptions,
    parser,
    vm::{Machine, NullSink},
};

/// A loop that counts `n` down to zero: four instructions per iteration.
fn countdown(n: usize) -> String {
    format!(
        "10 PUSH {}\n20 IFEQ 60\n30 PUSH -1\n40 ADD\n50 JUMP 20\n60 HLT\n",
        n
    )
}

/// `n` lines of PUSH followed by as many ADDs.
fn straight_line(n: usize) -> String {
    let mut source = String::new();
    let mut address = 10;
    for i in 0..n {
        source.push_str(&format!("{} PUSH {}\n", address, i));
        address += 10;
    }
    for _ in 1..n {
        source.push_str(&format!("{} ADD\n", address));
        address += 10;
    }
    source.push_str(&format!("{} HLT\n", address));
    source
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for iterations in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(iterations as u64 * 4));

        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, &iterations| {
                let parsed = parser::parse_program(&countdown(iterations));
                let options = ExecutionOptions::default();

                b.iter(|| {
                    let mut machine =
                        Machine::new(black_box(&parsed.program), &options, NullSink)
                            .expect("program is not empty");
                    machine.run().expect("countdown halts");
                    black_box(machine.steps())
                });
            },
        );
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for lines in [100, 1_000] {
        let source = straight_line(lines);
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(lines), &source, |b, source| {
            b.iter(|| black_box(parser::parse_program(black_box(source))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_load);
criterion_main!(benches);
