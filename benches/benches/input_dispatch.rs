// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_input::{
    BranchDiff, EventContext, EventKind, Input, InputAction, NodeId, Path, SceneEvent, SceneTree,
    listener_fn,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// `cols` columns, each a nested stack of `depth` boxes, every node listening.
fn gen_columns(cols: usize, depth: usize, cell: f64) -> SceneTree {
    let width = cols as f64 * cell;
    let height = depth as f64 * cell;
    let mut scene = SceneTree::new(Rect::new(0.0, 0.0, width, height));
    let root = scene.root();
    for c in 0..cols {
        let x0 = c as f64 * cell;
        let mut parent = root;
        for d in 0..depth {
            let y0 = d as f64 * cell * 0.5;
            let Some(node) = scene.insert(parent, Rect::new(x0, y0, x0 + cell, height)) else {
                break;
            };
            scene.add_listener(
                node,
                listener_fn(|kind, event: &mut SceneEvent<'_, NodeId>| {
                    black_box((kind, event.current_target()));
                }),
            );
            parent = node;
        }
    }
    scene
}

fn gen_points(count: usize, width: f64, height: f64) -> Vec<Point> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * width, rng.next_f64() * height))
        .collect()
}

fn bench_branch_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("branch_diff");
    for &depth in &[4usize, 16, 64] {
        let shared: Vec<u32> = (0..depth as u32 / 2).collect();
        let old = Path::from_nodes(shared.iter().copied().chain(1000..1000 + depth as u32 / 2));
        let new = Path::from_nodes(shared.iter().copied().chain(2000..2000 + depth as u32 / 2));
        group.bench_function(format!("compute_depth{}", depth), |b| {
            b.iter(|| {
                let diff = BranchDiff::compute(black_box(&old), black_box(&new));
                black_box(diff.transitions().count())
            });
        });
    }
    group.finish();
}

fn bench_mouse_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_sweep");
    for &(cols, depth) in &[(8usize, 4usize), (32, 8), (64, 16)] {
        let cell = 20.0;
        let points = gen_points(256, cols as f64 * cell, depth as f64 * cell);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(format!("move_cols{}_depth{}", cols, depth), |b| {
            b.iter_batched(
                || Input::new(gen_columns(cols, depth, cell)),
                |mut input| {
                    for (t, p) in points.iter().enumerate() {
                        input.mouse_move(*p, &mut EventContext::new(t as u64));
                    }
                    black_box(input.pointers().len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_batched_touches(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_touches");
    let (cols, depth, cell) = (16usize, 8usize, 20.0);
    let points = gen_points(64, cols as f64 * cell, depth as f64 * cell);
    group.throughput(Throughput::Elements(points.len() as u64 + 2));
    group.bench_function("drag_then_flush", |b| {
        b.iter_batched(
            || {
                let mut input = Input::new(gen_columns(cols, depth, cell));
                input.connect_listeners();
                input
            },
            |mut input| {
                let start = points[0];
                let _ = input.batch_action(InputAction::TouchStart { id: 1, point: start }, EventContext::new(0));
                for (t, p) in points.iter().enumerate() {
                    let _ = input.batch_action(
                        InputAction::TouchMove { id: 1, point: *p },
                        EventContext::new(t as u64),
                    );
                }
                input.flush();
                let end = points[points.len() - 1];
                let _ = input.batch_action(InputAction::TouchEnd { id: 1, point: end }, EventContext::new(1000));
                black_box(input.pointers().is_empty());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_dispatch_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for &depth in &[4usize, 16, 64] {
        group.bench_function(format!("wheel_bubble_depth{}", depth), |b| {
            let mut input = Input::new(gen_columns(1, depth, 20.0));
            let counter = std::rc::Rc::new(std::cell::Cell::new(0_u64));
            let sink = std::rc::Rc::clone(&counter);
            input.add_display_listener(listener_fn(move |kind, _event: &mut SceneEvent<'_, NodeId>| {
                if kind == EventKind::Wheel {
                    sink.set(sink.get() + 1);
                }
            }));
            let point = Point::new(10.0, depth as f64 * 20.0 - 1.0);
            b.iter(|| {
                input.wheel(point, kurbo::Vec2::new(0.0, 1.0), &mut EventContext::new(0));
            });
            black_box(counter.get());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_branch_diff,
    bench_mouse_sweep,
    bench_batched_touches,
    bench_dispatch_depth,
);
criterion_main!(benches);
