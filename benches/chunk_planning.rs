use audioscribe::pipeline::planner::{ChunkPlan, playback_window};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_chunk_planning(c: &mut Criterion) {
    // A ten-hour audiobook at the default chunk size
    c.bench_function("plan_10h_default_chunks", |b| {
        b.iter(|| ChunkPlan::build(black_box(36_000.0), 120.0, 1.0))
    });

    // Lecture-length input with no overlap
    c.bench_function("plan_1h_no_overlap", |b| {
        b.iter(|| ChunkPlan::build(black_box(3_600.0), 120.0, 0.0))
    });

    c.bench_function("playback_window", |b| {
        b.iter(|| playback_window(black_box(36_000.0), 1_800.0, 120.0))
    });
}

criterion_group!(benches, bench_chunk_planning);
criterion_main!(benches);
