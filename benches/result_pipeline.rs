//! Result pipeline benchmarks
//!
//! Measures the per-report cost of the callback: copy, strip, flatten,
//! classify and observe into the in-memory store.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_tune::callback::{CallbackConfig, TrialCallback};
use trueno_tune::sanitize::{flatten, scrub_hparams};
use trueno_tune::session::BindingPolicy;
use trueno_tune::tracking::MemoryBackend;
use trueno_tune::trial::TrialInfo;
use trueno_tune::value::{Mapping, Value};

fn nested_result(metrics: usize) -> Mapping {
    let mut eval = Mapping::new();
    let mut result = Mapping::new();
    for i in 0..metrics {
        #[allow(clippy::cast_precision_loss)]
        let v = i as f64 * 0.01;
        result.insert(format!("metric_{i}"), Value::Float(v));
        eval.insert(format!("acc_{i}"), Value::from(v as f32));
    }
    result.insert("eval".into(), Value::Map(eval));
    result.insert("training_iteration".into(), Value::Int(1));
    result.insert("pid".into(), Value::Int(4242));
    result
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    for size in [10, 100, 1000] {
        let result = nested_result(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &result, |b, r| {
            b.iter(|| flatten(black_box(r), "/"));
        });
    }
    group.finish();
}

fn bench_scrub(c: &mut Criterion) {
    let params = nested_result(100);
    c.bench_function("scrub_hparams_100", |b| {
        b.iter(|| scrub_hparams(black_box(&params)));
    });
}

fn bench_on_trial_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_trial_result");
    for size in [10, 100] {
        let config = CallbackConfig::builder()
            .binding(BindingPolicy::PerTrial)
            .build()
            .unwrap();
        let mut callback = TrialCallback::new(config, MemoryBackend::new()).unwrap();
        let logdir = std::env::temp_dir().join("trueno-tune-bench").join("t");
        let trial = TrialInfo::new("t", logdir, "bench");
        callback.on_trial_start(&trial).unwrap();

        let result = nested_result(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &result, |b, r| {
            b.iter(|| callback.on_trial_result(1, &trial, black_box(r)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flatten, bench_scrub, bench_on_trial_result);
criterion_main!(benches);
