// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Road junction.
//!
//! Draw three roads with a line generator, join them into a T, then pull one away.
//! Joint geometry requests are logged instead of rendered.
//!
//! Run:
//! - `cargo run -p diorama_demos --example road_junction`

use diorama_lines::{
    End, JointGenerators, JointKind, LineConfig, LineItem, LineItemGenerator, LineItemPrototype,
};
use diorama_scene::Scene;
use glam::Vec3;

fn draw(
    generator: &mut LineItemGenerator,
    scene: &mut Scene,
    from: Vec3,
    to: Vec3,
) -> diorama_lines::Result<LineItem> {
    generator.start(scene, from)?;
    // A few intermediate pointer positions, as a drag would produce.
    for step in 1..=4 {
        generator.update(scene, from.lerp(to, step as f32 / 4.0))?;
    }
    generator.finish(scene)
}

fn main() -> diorama_lines::Result<()> {
    diorama_demos::init_logging();
    let mut scene = Scene::new();

    let generators = JointGenerators::new()
        .with_straight(|scene, request| {
            tracing::info!(center = %request.center, "straight joint");
            vec![scene.insert()]
        })
        .with_junction(|scene, request| {
            tracing::info!(
                center = %request.center,
                edges = request.edges.len(),
                offset = request.offset,
                "junction"
            );
            request.edges.iter().map(|_| scene.insert()).collect()
        });

    let mut generator = LineItemGenerator::new(LineConfig::default());
    assert!(
        generator.start(&mut scene, Vec3::ZERO).is_err(),
        "no prototype configured yet"
    );
    generator.set_prototype(LineItemPrototype {
        width: 2.0,
        generators,
    });
    let _ = generator.on_finished(|_, item| {
        tracing::info!(id = item.id(), length = item.render_length(), "road finished");
    });

    let west = draw(&mut generator, &mut scene, Vec3::new(-10.0, 0.0, 0.0), Vec3::ZERO)?;
    let east = draw(&mut generator, &mut scene, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO)?;
    let north = draw(&mut generator, &mut scene, Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO)?;

    east.connection(End::End).connect(&mut scene, &west.connection(End::End));
    assert_eq!(west.joint_kind(End::End), JointKind::Straight);
    assert_eq!(west.offset(End::End), 0.0);

    north.connection(End::End).connect(&mut scene, &west.connection(End::End));
    assert_eq!(north.joint_kind(End::End), JointKind::Junction);
    // A right-angle T consumes half the road width on every arm.
    for road in [&west, &east, &north] {
        assert!((road.offset(End::End) - 1.0).abs() < 1e-4);
        assert!((road.render_length() - 9.0).abs() < 1e-4);
    }

    north.connection(End::End).disconnect(&mut scene, &west.connection(End::End));
    assert_eq!(west.joint_kind(End::End), JointKind::Straight);
    assert_eq!(north.joint_kind(End::End), JointKind::FreeEnd);
    println!(
        "after pulling north away: west {:?}, north {:?}",
        west.joint_kind(End::End),
        north.joint_kind(End::End)
    );
    Ok(())
}
