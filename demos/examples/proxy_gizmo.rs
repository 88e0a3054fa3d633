// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxy gizmo.
//!
//! A rotation ring around a body. Both colliders trigger the same handle, but a proxy lets only
//! the ring start the rotation: pressing on the body, which is nearer along that ray, does
//! nothing. Construction-plane hits are drawn on a logging debug sink.
//!
//! Run:
//! - `cargo run -p diorama_demos --example proxy_gizmo`

use std::cell::RefCell;
use std::rc::Rc;

use diorama_collide::{
    Camera, CameraView, Collider, ColliderSet, EdgeEvaluator, Raycaster, Raycasters,
};
use diorama_handles::{HandlesConfig, MouseControlHandles, ProxyHandler, RotationHandler};
use diorama_scene::{Color, DebugSink, Scene};
use glam::Vec3;
use kurbo::Point;

#[derive(Debug, Default)]
struct LogSink {
    points: usize,
}

impl DebugSink for LogSink {
    fn point(&mut self, position: Vec3, color: Color) {
        self.points += 1;
        tracing::info!(%position, ?color, "debug point");
    }
}

fn screen(scene: &Scene, camera: &dyn CameraView, world: Vec3) -> Point {
    let p = camera.project(scene, world);
    Point::new(f64::from(p.x), f64::from(p.y))
}

fn main() {
    diorama_demos::init_logging();
    let mut scene = Scene::new();
    let mut colliders = ColliderSet::new();
    let eye = scene.insert();
    scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
    let camera = Camera::new(eye);

    let object = scene.insert();
    let body = colliders.insert(Collider::cuboid(object, Vec3::ONE));
    let ring = colliders
        .insert(Collider::plane(object, Vec3::Z).with_edge(EdgeEvaluator::annulus(1.5, 2.0)));
    let mut rc = Raycaster::new();
    rc.add_target(body);
    rc.add_target(ring);
    let mut chain = Raycasters::new();
    chain.push(rc);
    let mut handles = MouseControlHandles::new(chain, HandlesConfig::default());

    let sink = Rc::new(RefCell::new(LogSink::default()));
    let rotate = RotationHandler::new(object, Vec3::Z).with_debug(sink.clone());
    let proxy = ProxyHandler::new([ring], Box::new(rotate));
    handles.add_with(&[body, ring], Rc::new(RefCell::new(proxy)));

    let center = screen(&scene, &camera, Vec3::ZERO);
    let started = handles.mouse_down(&mut scene, &mut colliders, &camera, center);
    assert!(started.is_empty(), "the body is in front; the proxy refuses");
    let _ = handles.mouse_up(&mut scene, &mut colliders, &camera, center);

    let on_ring = screen(&scene, &camera, Vec3::new(1.75, 0.0, 0.0));
    let quarter = screen(&scene, &camera, Vec3::new(0.0, 1.75, 0.0));
    let started = handles.mouse_down(&mut scene, &mut colliders, &camera, on_ring);
    assert_eq!(started.len(), 1, "ring starts the rotation");
    let _ = handles.mouse_move(&mut scene, &mut colliders, &camera, quarter);
    let _ = handles.mouse_up(&mut scene, &mut colliders, &camera, quarter);

    let x = scene.to_world(object).transform_vector3(Vec3::X);
    println!("local X after a quarter turn: {x}");
    assert!(x.abs_diff_eq(Vec3::Y, 1e-3));
    assert_eq!(sink.borrow().points, 2);
}
