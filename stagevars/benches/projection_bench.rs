//! Benchmarks for variable projection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stagevars::context::{StageExecutionContext, VARIABLES_FIELD};
use stagevars::tasks::{EvaluateVariablesTask, Task};

fn stage_with_variables(count: usize) -> StageExecutionContext {
    let variables: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "key": if i % 10 == 0 { String::new() } else { format!("var_{}", i % 250) },
                "value": {"index": i, "tags": ["a", "b"]}
            })
        })
        .collect();

    StageExecutionContext::new()
        .with_entry("cluster", serde_json::json!("prod"))
        .with_entry(VARIABLES_FIELD, serde_json::Value::Array(variables))
}

fn projection_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let task = EvaluateVariablesTask::new();
    let stage = stage_with_variables(1_000);

    c.bench_function("evaluate_variables_1k", |b| {
        b.iter(|| {
            let result = runtime.block_on(task.execute(black_box(&stage)));
            black_box(result)
        })
    });
}

criterion_group!(benches, projection_benchmark);
criterion_main!(benches);
