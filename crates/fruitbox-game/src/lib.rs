//! Fruitbox -- a drop-and-merge game core over a 2D rigid-body simulation.
//!
//! Same-rank fruits merge on contact into the next rank up; the player drops
//! fruits into a box and loses when the stack overflows the rim. Two
//! variants ship: the score-chasing Classic box and the Pin puzzle field
//! with removable pins, magma, and water.
//!
//! The crate is the rule engine only. Physics is delegated to
//! [`fruitbox_physics`], rendering and input wiring belong to a presentation
//! layer that reads [`GameCore::hud`](core::GameCore::hud) and
//! [`GameCore::fruits`](core::GameCore::fruits) and calls the input entry
//! points.
//!
//! # Quick Start
//!
//! ```
//! use fruitbox_game::prelude::*;
//!
//! let ranks = Box::new(ScriptedRanks::new(&[0, 1, 2]));
//! let mut game = GameCore::new(PlayfieldConfig::classic(), ranks);
//!
//! game.init();
//! assert_eq!(game.state(), GameState::Ready);
//!
//! game.press_start();
//! assert_eq!(game.state(), GameState::Playable);
//!
//! game.pointer_move(480.0);
//! game.request_drop();
//! for _ in 0..60 {
//!     game.step();
//! }
//! assert_eq!(game.state(), GameState::Playable);
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod core;
pub mod layout;
pub mod rng;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::catalog::{MAX_RANK, POP_MAX_RANK, Rank};
    pub use crate::config::{PlayfieldConfig, Variant};
    pub use crate::core::{BodyTag, GameCore, GameState, HudSnapshot};
    pub use crate::rng::{PcgRankSource, RankSource, ScriptedRanks};
    pub use fruitbox_physics::prelude::BodyId;
}
