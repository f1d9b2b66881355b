//! Fruitbox Physics -- rapier2d adapter for the drop-and-merge game core.
//!
//! This crate wraps a rapier2d simulation behind the narrow collaborator
//! interface the game core consumes: body creation with collision-group
//! filtering, sleep control, position/velocity setters, world membership
//! queries, and a fixed-step driver that reports collision-started events.
//!
//! The adapter owns all rapier storage. Callers hold opaque [`BodyId`]
//! handles; ids are never recycled, so a handle to a removed body reliably
//! fails the [`PhysicsWorld::contains`] liveness test instead of aliasing a
//! newer body.
//!
//! # Coordinates
//!
//! Positions are in pixels with the y-axis pointing down (screen
//! convention), so gravity is a positive y value and "above the rim" means a
//! *smaller* y.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Combined with a fixed
//! timestep and the sorted collision batches returned by
//! [`PhysicsWorld::step`], identical inputs produce identical simulations on
//! the same platform.
//!
//! # Quick Start
//!
//! ```
//! use fruitbox_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new(0.0, 3600.0);
//! let floor = world.create_rect_body(
//!     100.0,
//!     200.0,
//!     200.0,
//!     10.0,
//!     0.0,
//!     BodySpec {
//!         material: Material { friction: 0.5, mass: 10.0, restitution: 0.1 },
//!         filter: CollisionFilter::solid(),
//!         is_static: true,
//!         start_asleep: false,
//!     },
//! );
//!
//! assert!(world.contains(floor));
//! let pairs = world.step(1.0 / 60.0);
//! assert!(pairs.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod filter;
pub mod world;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::filter::{Category, CollisionFilter};
    pub use crate::world::{BodyId, BodySpec, CollisionPair, Material, PhysicsWorld};
}
