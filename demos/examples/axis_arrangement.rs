// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis arrangement.
//!
//! A translation gizmo with one arrow per axis and a ground plane handle that snaps to a grid.
//! The arrows are children of the moved coordinate, so they follow it. The plane handle refuses
//! to start while the X arrow is dragging. Every part is built and mounted through the
//! rendering contracts, so the mounted transforms are checked to follow the drag.
//!
//! Run:
//! - `cargo run -p diorama_demos --example axis_arrangement`

use std::cell::RefCell;
use std::rc::Rc;

use diorama_collide::{Camera, CameraView, Collider, ColliderSet, Raycaster, Raycasters};
use diorama_demos::{Shape, ShapeLog};
use diorama_handles::{
    CursorModifier, DirectionalMoveHandler, HandlesConfig, MouseControlHandles, PlaneMoveHandler,
    SharedHandler,
};
use diorama_scene::{Color, CoordinateId, RenderBinding, RenderingObjectBuilder, Scene};
use glam::Vec3;
use kurbo::Point;

fn screen(scene: &Scene, camera: &dyn CameraView, world: Vec3) -> Point {
    let p = camera.project(scene, world);
    Point::new(f64::from(p.x), f64::from(p.y))
}

fn main() {
    diorama_demos::init_logging();
    let mut scene = Scene::new();
    let mut colliders = ColliderSet::new();

    let eye = scene.insert();
    let eye_at = Vec3::new(6.0, 8.0, 12.0);
    // Cameras look down -Z, so Z points back at the eye.
    scene.set_direction_z_axis(eye, eye_at, eye_at);
    let camera = Camera::new(eye);

    let engine = Rc::new(RefCell::new(ShapeLog::default()));
    let mut bindings = Vec::new();
    let mut mount = |scene: &mut Scene, at: CoordinateId, shape: Shape| {
        let binding = RenderBinding::mount(scene, &engine, at, shape).expect("live coordinate");
        bindings.push(binding);
    };

    let object = scene.insert();
    let body = engine.borrow_mut().cuboid(Vec3::splat(0.6), Color::WHITE);
    mount(&mut scene, object, body);
    let mut gizmo = Raycaster::new();
    let mut arrows = Vec::new();
    for (axis, color) in [(Vec3::X, Color::RED), (Vec3::Y, Color::GREEN), (Vec3::Z, Color::BLUE)] {
        let arrow = scene.insert();
        scene.set_position(arrow, axis * 1.5);
        scene.add_child(object, arrow).expect("fresh arrow has no parent");
        let shape = engine.borrow_mut().vector(axis * 1.7, color);
        mount(&mut scene, arrow, shape);
        let half = Vec3::splat(0.15) + axis * 0.85;
        let id = colliders.insert(Collider::cuboid(arrow, half));
        gizmo.add_target(id);
        arrows.push((axis, id));
    }
    let pad = scene.insert();
    scene.add_child(object, pad).expect("fresh pad has no parent");
    let pad_shape = engine.borrow_mut().plane(4.0, 4.0, Color::rgb(90, 90, 90));
    mount(&mut scene, pad, pad_shape);
    let pad_id = colliders.insert(Collider::plane(pad, Vec3::Y));
    assert_eq!(engine.borrow().built(), 5);
    assert_eq!(engine.borrow().mounted(), 5);
    let mut ground = Raycaster::new();
    ground.add_target(pad_id);

    let mut chain = Raycasters::new();
    chain.push(gizmo);
    chain.push(ground);
    let mut handles = MouseControlHandles::new(chain, HandlesConfig::default());

    let mut x_handler: Option<SharedHandler> = None;
    for (axis, id) in &arrows {
        let h: SharedHandler = Rc::new(RefCell::new(DirectionalMoveHandler::new(
            object,
            *axis,
            CursorModifier::none(),
        )));
        if *axis == Vec3::X {
            x_handler = Some(h.clone());
        }
        handles.add(*id, h);
    }
    let mut slide = PlaneMoveHandler::new(object, Vec3::Y, CursorModifier::grid(1.0));
    if let Some(x) = &x_handler {
        slide.state_mut().exclude(x);
    }
    handles.add(pad_id, Rc::new(RefCell::new(slide)));

    // Drag the X arrow to the right. Only the on-axis part of the drag applies.
    let grab = screen(&scene, &camera, Vec3::new(1.5, 0.0, 0.0));
    let drop = screen(&scene, &camera, Vec3::new(3.5, 0.0, 0.0));
    let started = handles.mouse_down(&mut scene, &mut colliders, &camera, grab);
    assert_eq!(started.len(), 1, "only the X arrow starts; the gizmo blocks the ground");
    let _ = handles.mouse_move(&mut scene, &mut colliders, &camera, drop);
    let _ = handles.mouse_up(&mut scene, &mut colliders, &camera, drop);
    let moved = scene.world_origin(object);
    println!("after X drag: {moved}");
    assert!(moved.x > 0.5, "moved along X");
    assert_eq!((moved.y, moved.z), (0.0, 0.0), "and only along X");

    // The arrows came along, in the scene and in the renderer.
    let arrow = scene.children(object)[0];
    let arrow_x = scene.world_origin(arrow);
    assert!((arrow_x.x - moved.x - 1.5).abs() < 1e-4);
    let mounted = engine.borrow().world(arrow).expect("arrow is mounted");
    assert!(mounted.w_axis.truncate().abs_diff_eq(arrow_x, 1e-4), "renderer synced");
    assert!(matches!(
        engine.borrow().shape(arrow),
        Some(Shape::Vector { color: Color::RED, .. })
    ));

    // Slide on the ground pad, away from the arrows; the grid keeps it on integers.
    let grab = screen(&scene, &camera, Vec3::new(1.2, 0.0, 1.4) + moved);
    let drop = screen(&scene, &camera, Vec3::new(-0.3, 0.0, 3.1) + moved);
    let started = handles.mouse_down(&mut scene, &mut colliders, &camera, grab);
    assert_eq!(started.len(), 1, "ground pad starts");
    let _ = handles.mouse_move(&mut scene, &mut colliders, &camera, drop);
    let _ = handles.mouse_up(&mut scene, &mut colliders, &camera, drop);
    let slid = scene.world_origin(object);
    println!("after grid slide: {slid}");
    assert!(slid.abs_diff_eq(slid.round(), 1e-4));
    println!("renderer syncs: {}", engine.borrow().syncs());

    for binding in bindings {
        let _ = binding.unmount(&mut scene, &engine);
    }
    assert_eq!(engine.borrow().mounted(), 0);
}
