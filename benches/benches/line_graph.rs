// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use diorama_lines::{
    End, JointGenerators, LineConfig, LineItem, junction_offset, min_subtended_angle,
};
use diorama_scene::Scene;
use glam::Vec3;

/// `arms` items radiating from the origin, all connected at their start.
fn star(arms: usize) -> (Scene, Vec<LineItem>) {
    let mut scene = Scene::new();
    let cfg = LineConfig::default();
    let mut items: Vec<LineItem> = Vec::with_capacity(arms);
    for i in 0..arms {
        let a = i as f32 / arms as f32 * core::f32::consts::TAU;
        let end = Vec3::new(a.cos(), 0.0, a.sin()) * 5.0;
        let item = LineItem::new(&mut scene, Vec3::ZERO, end, 0.5, JointGenerators::new(), cfg)
            .expect("fresh coordinates");
        if let Some(first) = items.first() {
            item.connection(End::Start)
                .connect(&mut scene, &first.connection(End::Start));
        }
        items.push(item);
    }
    (scene, items)
}

fn bench_offsets(c: &mut Criterion) {
    let dirs: Vec<Vec3> = (0..8)
        .map(|i| {
            let a = i as f32 * 0.7;
            Vec3::new(a.cos(), 0.0, a.sin())
        })
        .collect();
    c.bench_function("junction_offset_8", |b| {
        b.iter(|| {
            let angle = min_subtended_angle(black_box(&dirs)).unwrap_or(0.0);
            black_box(junction_offset(0.5, angle, 1e-4))
        });
    });
}

fn bench_hub_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub_move");
    for &arms in &[3_usize, 6, 12] {
        group.bench_function(format!("arms_{arms}"), |b| {
            b.iter_batched(
                || star(arms),
                |(mut scene, items)| {
                    items[0].set_end_position(&mut scene, End::Start, Vec3::new(0.5, 0.0, 0.5));
                    black_box(items[arms - 1].render_length())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_offsets, bench_hub_move);
criterion_main!(benches);
