// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use diorama_collide::{
    Camera, Collider, ColliderFlags, ColliderSet, EdgeEvaluator, Ray, Raycaster, Raycasters,
};
use diorama_scene::Scene;
use glam::{Vec2, Vec3};

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
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u32 << 24) as f32)
    }
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// `count` colliders of mixed shapes scattered in a 20-unit cube, all registered on one raycaster.
fn scatter(count: usize, seed: u64) -> (Scene, ColliderSet, Raycaster, Camera) {
    let mut rng = Rng::new(seed);
    let mut scene = Scene::new();
    let eye = scene.insert();
    scene.set_position(eye, Vec3::new(0.0, 0.0, 30.0));
    let mut set = ColliderSet::new();
    let mut rc = Raycaster::new();
    for i in 0..count {
        let c = scene.insert();
        let p = Vec3::new(rng.range(-10.0, 10.0), rng.range(-10.0, 10.0), rng.range(-10.0, 10.0));
        scene.set_position(c, p);
        scene.rotate(c, Vec3::new(rng.next_f32(), rng.next_f32(), 1.0), rng.range(0.0, 3.0));
        let collider = match i % 3 {
            0 => Collider::ball(c, rng.range(0.2, 1.0)),
            1 => Collider::cuboid(c, Vec3::splat(rng.range(0.2, 1.0))),
            _ => Collider::plane(c, Vec3::Z).with_edge(EdgeEvaluator::annulus(0.5, 1.0)),
        };
        rc.add_target(set.insert(collider));
    }
    (scene, set, rc, Camera::new(eye))
}

fn bench_shapes(c: &mut Criterion) {
    let mut scene = Scene::new();
    let at = scene.insert();
    scene.rotate_y(at, 0.3);
    let ray = Ray::new(Vec3::new(0.1, 0.2, 10.0), Vec3::NEG_Z);
    let shapes = [
        ("ball", Collider::ball(at, 1.0)),
        ("box", Collider::cuboid(at, Vec3::ONE)),
        ("plane", Collider::plane(at, Vec3::Z)),
        (
            "plane_annulus",
            Collider::plane(at, Vec3::Z).with_edge(EdgeEvaluator::annulus(0.5, 1.0)),
        ),
    ];
    let mut group = c.benchmark_group("collider_check_ray");
    for (name, collider) in &shapes {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(collider.check_ray(&scene, black_box(&ray))));
        });
    }
    group.finish();
}

fn bench_raycaster(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycaster_check");
    for &n in &[16_usize, 256, 4096] {
        let (scene, set, rc, camera) = scatter(n, 0x5eed);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("mixed_{n}"), |b| {
            b.iter_batched(
                || rc.clone(),
                |mut rc| {
                    let hits = rc.check(&scene, &set, &camera, black_box(Vec2::new(0.1, -0.05)));
                    black_box(hits.len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_chain_blocking(c: &mut Criterion) {
    let (mut scene, mut set, background, camera) = scatter(1024, 0xb10c);
    // Foreground gizmo right in front of the camera.
    let gizmo = scene.insert();
    scene.set_position(gizmo, Vec3::new(0.0, 0.0, 20.0));
    let front = set.insert(Collider::ball(gizmo, 2.0));
    let ghost = set.insert(
        Collider::ball(gizmo, 2.0).with_flags(ColliderFlags::ENABLED | ColliderFlags::TRANSPARENT),
    );

    let mut group = c.benchmark_group("raycasters_chain");
    for (name, target) in [("opaque_front", front), ("transparent_front", ghost)] {
        let mut fg = Raycaster::new();
        fg.add_target(target);
        let mut chain = Raycasters::new();
        chain.push(fg);
        chain.push(background.clone());
        group.bench_function(name, |b| {
            b.iter(|| {
                chain.check(&scene, &set, &camera, black_box(Vec2::ZERO));
                black_box(chain.nearest().map(|h| h.distance))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shapes, bench_raycaster, bench_chain_blocking);
criterion_main!(benches);
