//! # Moving Average Benchmark
//!
//! Compares the running-sum window against full resummation across window sizes, and
//! measures the async transformer on top of the same input.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use futures::StreamExt;
use slidewave::transformers::MovingAverageTransformer;
use slidewave::{AveragingStrategy, MovingAverageExt, Transformer, WindowConfig};
use std::hint::black_box;

const INPUT_LEN: usize = 10_000;

fn input() -> Vec<f64> {
  (0..INPUT_LEN).map(|i| (i as f64 * 0.37).sin() * 1e3).collect()
}

fn strategy_benchmark(c: &mut Criterion) {
  let data = input();
  let mut group = c.benchmark_group("moving_average_strategy");
  group.sample_size(20);
  group.throughput(Throughput::Elements(INPUT_LEN as u64));

  for window_size in [4, 64, 1024] {
    for (label, strategy) in [
      ("running_sum", AveragingStrategy::RunningSum),
      ("resum", AveragingStrategy::Resum),
    ] {
      let config = WindowConfig::new(window_size).with_strategy(strategy);
      group.bench_with_input(BenchmarkId::new(label, window_size), &config, |b, config| {
        b.iter(|| {
          let total: f64 = data
            .iter()
            .copied()
            .moving_average_with(config.clone())
            .unwrap()
            .sum();
          black_box(total)
        });
      });
    }
  }

  group.finish();
}

fn transformer_benchmark(c: &mut Criterion) {
  let data = input();
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .unwrap();

  let mut group = c.benchmark_group("moving_average_transformer");
  group.sample_size(20);
  group.throughput(Throughput::Elements(INPUT_LEN as u64));

  for window_size in [4, 64, 1024] {
    group.bench_with_input(
      BenchmarkId::from_parameter(window_size),
      &window_size,
      |b, &window_size| {
        b.to_async(&rt).iter(|| {
          let data = data.clone();
          async move {
            let mut transformer = MovingAverageTransformer::<f64>::new(window_size).unwrap();
            let output = transformer.transform(Box::pin(futures::stream::iter(data)));
            black_box(output.fold(0.0, |acc, v| async move { acc + v }).await)
          }
        });
      },
    );
  }

  group.finish();
}

criterion_group!(benches, strategy_benchmark, transformer_benchmark);
criterion_main!(benches);
