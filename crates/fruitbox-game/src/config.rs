//! Playfield configuration for the two shipped variants.
//!
//! All distances are pixels with the y-axis pointing down; gravity pulls
//! toward larger y. The numbers are game tuning and should only change
//! together with the layouts in [`crate::layout`].

use fruitbox_physics::prelude::{Category, CollisionFilter, Material};

use crate::catalog::{POP_MAX_RANK, Rank};

/// Simulation step, 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Downward gravity in px/s².
pub const GRAVITY_Y: f64 = 3600.0;

/// Fall-speed cap for in-flight fruits, px/s. Keeps per-step displacement
/// below the floor thickness so a fast fruit cannot tunnel through it.
pub const MAX_FALL_VELOCITY: f64 = 600.0;

/// Seconds of simulation time between accepted drops.
pub const DROP_COOLDOWN_SECS: f64 = 0.4;

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which playfield ruleset is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Variant {
    /// The score-chasing box: drop, stack, merge.
    Classic,
    /// The puzzle field with pins, magma, and water. No score; the goal is a
    /// single watermelon merge without feeding the magma.
    Pin,
}

// ---------------------------------------------------------------------------
// PlayfieldConfig
// ---------------------------------------------------------------------------

/// Geometry, materials, and status texts for one variant.
#[derive(Debug, Clone)]
pub struct PlayfieldConfig {
    pub variant: Variant,
    /// Total play area width in pixels.
    pub game_width: f64,
    /// Total play area height in pixels.
    pub game_height: f64,
    /// Thickness of the box walls.
    pub wall_width: f64,
    /// Height of the box walls; the rim sits at `game_height - wall_height`.
    pub wall_height: f64,
    /// Width of the box floor.
    pub floor_width: f64,
    /// Thickness of the box floor.
    pub floor_height: f64,
    /// Friction of the static geometry.
    pub box_friction: f64,
    /// Whether merges accrue score.
    pub score_enabled: bool,
    /// Status shown while waiting for start.
    pub text_ready: &'static str,
    /// Status shown during play.
    pub text_playing: &'static str,
    /// Status shown on a win.
    pub text_win: &'static str,
    /// Status shown on a loss.
    pub text_gameover: &'static str,
}

impl PlayfieldConfig {
    /// The 960x540 classic box.
    pub fn classic() -> Self {
        Self {
            variant: Variant::Classic,
            game_width: 960.0,
            game_height: 540.0,
            wall_width: 10.0,
            wall_height: 440.0,
            floor_width: 360.0,
            floor_height: 10.0,
            box_friction: 0.5,
            score_enabled: true,
            text_ready: "Please Start",
            text_playing: "",
            text_win: "Game over",
            text_gameover: "Game over",
        }
    }

    /// The 640x480 pin puzzle. The floor spans the full width and the walls
    /// are slipperier than the classic box.
    pub fn pin() -> Self {
        Self {
            variant: Variant::Pin,
            game_width: 640.0,
            game_height: 480.0,
            wall_width: 10.0,
            wall_height: 440.0,
            floor_width: 640.0,
            floor_height: 10.0,
            box_friction: 0.1,
            score_enabled: false,
            text_ready: "Merge the fruits",
            text_playing: "Merge the fruits",
            text_win: "You win",
            text_gameover: "You lose",
        }
    }

    // -- derived geometry ---------------------------------------------------

    /// Spawn height of held and next-up fruits: just above the rim, clear of
    /// the largest player-spawnable fruit.
    pub fn pop_y(&self) -> f64 {
        self.game_height - self.wall_height - f64::from(POP_MAX_RANK) * 9.0 - 10.0
    }

    /// Fixed x of the next-up preview slot.
    pub fn next_pop_x(&self) -> f64 {
        750.0
    }

    /// The rim height: a settled fruit whose top rises above this line ends
    /// the game.
    pub fn rim_y(&self) -> f64 {
        self.game_height - self.wall_height
    }

    /// Leftmost center x a held fruit of the given rank may occupy.
    pub fn left_limit(&self, rank: Rank) -> f64 {
        self.game_width / 2.0 - self.floor_width / 2.0 + self.wall_width + rank.radius()
    }

    /// Rightmost center x a held fruit of the given rank may occupy.
    pub fn right_limit(&self, rank: Rank) -> f64 {
        self.game_width / 2.0 + self.floor_width / 2.0 - self.wall_width - rank.radius()
    }

    /// Clamp a pointer x into the held fruit's legal range.
    pub fn clamp_x(&self, x: f64, rank: Rank) -> f64 {
        x.max(self.left_limit(rank)).min(self.right_limit(rank))
    }

    // -- materials and filters ----------------------------------------------

    /// Material of every fruit body.
    pub fn fruit_material(&self) -> Material {
        Material {
            friction: 0.01,
            mass: 2.0,
            restitution: 0.01,
        }
    }

    /// Material of the static box geometry.
    pub fn box_material(&self) -> Material {
        Material {
            friction: self.box_friction,
            mass: 10.0,
            restitution: 0.1,
        }
    }

    /// Filter for a held fruit: passes through everything except the box and
    /// released fruits (plus pins in the Pin variant) until dropped.
    pub fn ready_fruit_filter(&self) -> CollisionFilter {
        let mask = match self.variant {
            Variant::Classic => Category::BOX | Category::FRUIT,
            Variant::Pin => Category::BOX | Category::FRUIT | Category::PIN,
        };
        CollisionFilter::new(Category::READY_FRUIT, mask)
    }

    /// Filter for a released fruit. The Pin variant adds the hazard category
    /// so released fruits can land in the magma.
    pub fn fruit_filter(&self) -> CollisionFilter {
        let mask = match self.variant {
            Variant::Classic => Category::BOX | Category::FRUIT,
            Variant::Pin => Category::BOX | Category::FRUIT | Category::PIN | Category::GIMMICK,
        };
        CollisionFilter::new(Category::FRUIT, mask)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_pop_y_is_above_the_rim() {
        let config = PlayfieldConfig::classic();
        assert_eq!(config.pop_y(), 45.0);
        assert_eq!(config.rim_y(), 100.0);
        assert!(config.pop_y() < config.rim_y());
    }

    #[test]
    fn clamp_respects_wall_and_radius() {
        let config = PlayfieldConfig::classic();
        let rank = Rank::new(0);
        // 960/2 - 360/2 + 10 + 10 = 320, mirrored on the right.
        assert_eq!(config.left_limit(rank), 320.0);
        assert_eq!(config.right_limit(rank), 640.0);
        assert_eq!(config.clamp_x(-1e9, rank), 320.0);
        assert_eq!(config.clamp_x(1e9, rank), 640.0);
        assert_eq!(config.clamp_x(480.0, rank), 480.0);
    }

    #[test]
    fn bigger_fruits_get_narrower_range() {
        let config = PlayfieldConfig::classic();
        let small = Rank::new(0);
        let big = Rank::new(4);
        assert!(config.left_limit(big) > config.left_limit(small));
        assert!(config.right_limit(big) < config.right_limit(small));
    }

    #[test]
    fn held_fruit_never_masks_hazards() {
        for config in [PlayfieldConfig::classic(), PlayfieldConfig::pin()] {
            let filter = config.ready_fruit_filter();
            assert_eq!(filter.category, Category::READY_FRUIT);
            assert!(!filter.mask.intersects(Category::GIMMICK));
        }
    }

    #[test]
    fn released_fruit_masks_hazards_only_in_pin() {
        assert!(!PlayfieldConfig::classic()
            .fruit_filter()
            .mask
            .intersects(Category::GIMMICK));
        assert!(PlayfieldConfig::pin()
            .fruit_filter()
            .mask
            .intersects(Category::GIMMICK));
    }
}
