//! Static playfield construction for each variant.
//!
//! Geometry is a flat list of rectangles placed in pixel coordinates. Walls
//! and floors are untagged static bodies; pins, magma, water, and pre-placed
//! fruits get tags in the core's side table so the reaction engine can
//! recognize them.

use std::collections::HashMap;
use std::f64::consts::PI;

use fruitbox_physics::prelude::*;

use crate::catalog::Rank;
use crate::config::{PlayfieldConfig, Variant};
use crate::core::BodyTag;

/// Build the variant's static field into `physics`, tagging special bodies.
pub(crate) fn build_playfield(
    config: &PlayfieldConfig,
    physics: &mut PhysicsWorld,
    tags: &mut HashMap<BodyId, BodyTag>,
) {
    build_box(config, physics);
    if config.variant == Variant::Pin {
        build_pin_field(config, physics, tags);
    }
}

/// The shared box: two walls and a floor, hugging the bottom of the area.
fn build_box(config: &PlayfieldConfig, physics: &mut PhysicsWorld) {
    let left_x = config.game_width / 2.0 - config.floor_width / 2.0 + config.wall_width / 2.0;
    let right_x = config.game_width / 2.0 + config.floor_width / 2.0 - config.wall_width / 2.0;
    let wall_y = config.game_height - config.wall_height / 2.0;
    let floor_x = config.game_width / 2.0;
    let floor_y = config.game_height - config.floor_height / 2.0;

    wall(config, physics, left_x, wall_y, config.wall_width, config.wall_height, 0.0);
    wall(config, physics, right_x, wall_y, config.wall_width, config.wall_height, 0.0);
    wall(config, physics, floor_x, floor_y, config.floor_width, config.floor_height, 0.0);
}

/// The Pin variant's interior: a walled magma pit in the middle, a water
/// reservoir and a fruit shelf held up by vertical pins, slopes feeding the
/// lower chamber, and two fruits already in play.
fn build_pin_field(
    config: &PlayfieldConfig,
    physics: &mut PhysicsWorld,
    tags: &mut HashMap<BodyId, BodyTag>,
) {
    // Guard walls and slopes, as (x, y, w, h, angle).
    let guards: [(f64, f64, f64, f64, f64); 14] = [
        (265.0, 180.0, 10.0, 120.0, 0.0), // magma pit, left
        (375.0, 180.0, 10.0, 120.0, 0.0), // magma pit, right
        (264.0, 255.0, 10.0, 10.0, 0.0),  // pit lip, left
        (376.0, 255.0, 10.0, 10.0, 0.0),  // pit lip, right
        (264.0, 400.0, 10.0, 60.0, 0.0),  // lower chamber, left
        (376.0, 400.0, 10.0, 60.0, 0.0),  // lower chamber, right
        (110.0, 150.0, 10.0, 60.0, 0.0),  // water pin guard, left
        (130.0, 150.0, 10.0, 60.0, 0.0),  // water pin guard, right
        (510.0, 150.0, 10.0, 60.0, 0.0),  // fruit pin guard, left
        (530.0, 150.0, 10.0, 60.0, 0.0),  // fruit pin guard, right
        (320.0, 425.0, 300.0, 10.0, 0.0), // lower chamber floor
        (180.0, 400.0, 10.0, 60.0, 0.0),  // lower chamber gate
        (125.0, 260.0, 10.0, 250.0, -PI / 3.0), // water slope
        (515.0, 260.0, 10.0, 250.0, PI / 3.0),  // fruit slope
    ];
    for (x, y, w, h, angle) in guards {
        wall(config, physics, x, y, w, h, angle);
    }

    let magma = physics.create_rect_body(
        320.0,
        180.0,
        100.0,
        50.0,
        0.0,
        BodySpec {
            material: Material {
                friction: 0.01,
                mass: 10.0,
                restitution: 0.0,
            },
            filter: CollisionFilter::new(
                Category::GIMMICK,
                Category::GIMMICK | Category::PIN | Category::FRUIT | Category::BOX,
            ),
            is_static: false,
            start_asleep: false,
        },
    );
    tags.insert(magma, BodyTag::Magma);

    // Water ignores fruits entirely; it only interacts with the field and
    // the magma.
    let water = physics.create_circle_body(
        40.0,
        150.0,
        25.0,
        BodySpec {
            material: config.fruit_material(),
            filter: CollisionFilter::new(
                Category::GIMMICK,
                Category::GIMMICK | Category::PIN | Category::BOX,
            ),
            is_static: false,
            start_asleep: false,
        },
    );
    tags.insert(water, BodyTag::Water);

    for (x, y, w, h) in [
        (320.0, 245.0, 120.0, 10.0), // holds the magma over the pit
        (120.0, 160.0, 10.0, 160.0), // holds back the water
        (520.0, 160.0, 10.0, 160.0), // holds back the shelf fruit
    ] {
        let pin = physics.create_rect_body(
            x,
            y,
            w,
            h,
            0.0,
            BodySpec {
                material: Material {
                    friction: 0.1,
                    mass: 1.0,
                    restitution: 0.0,
                },
                filter: CollisionFilter::new(
                    Category::PIN,
                    Category::PIN | Category::FRUIT | Category::BOX,
                ),
                is_static: false,
                start_asleep: false,
            },
        );
        tags.insert(pin, BodyTag::Pin);
    }

    // Two rank-1 fruits already in play: one on the shelf, one in the lower
    // chamber.
    for (x, y) in [(580.0, 160.0), (200.0, 395.0)] {
        let rank = Rank::new(1);
        let fruit = physics.create_circle_body(
            x,
            y,
            rank.radius(),
            BodySpec {
                material: config.fruit_material(),
                filter: config.fruit_filter(),
                is_static: false,
                start_asleep: false,
            },
        );
        tags.insert(fruit, BodyTag::Fruit(rank));
    }
}

fn wall(
    config: &PlayfieldConfig,
    physics: &mut PhysicsWorld,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    angle: f64,
) -> BodyId {
    physics.create_rect_body(
        x,
        y,
        width,
        height,
        angle,
        BodySpec {
            material: config.box_material(),
            filter: CollisionFilter::solid(),
            is_static: true,
            start_asleep: false,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
