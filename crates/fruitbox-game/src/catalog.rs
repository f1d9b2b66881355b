//! Static fruit catalog: rank-indexed radius, color, score, and sprite
//! lookups.
//!
//! Ranks run from 0 (cherry) to [`MAX_RANK`] (watermelon). Radius and score
//! grow strictly with rank, so a merge always produces a larger, more
//! valuable fruit.

use serde::{Deserialize, Serialize};

/// Highest rank a fruit can reach. Merging two fruits of this rank is
/// terminal: nothing is spawned.
pub const MAX_RANK: u8 = 10;

/// Player-spawned fruits sample their rank uniformly from `0..POP_MAX_RANK`.
pub const POP_MAX_RANK: u8 = 5;

/// Radius of a rank-0 fruit in pixels.
const BASE_SIZE: f64 = 10.0;

/// Radius gained per rank in pixels.
const RANK_STEP: f64 = 9.0;

const COLORS: [&str; 11] = [
    "#e33", "#d66", "#c5e", "#da1", "#e91", "#e11", "#eea", "#ecc", "#cc3", "#aea", "#1e1",
];

/// Triangular score sequence: merging rank r awards `SCORES[r]`.
const SCORES: [u64; 11] = [1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 66];

const TEXTURES: [&str; 11] = [
    "img/0_cherry.png",
    "img/1_strawberry.png",
    "img/2_grape.png",
    "img/3_decopon.png",
    "img/4_persimmon.png",
    "img/5_apple.png",
    "img/6_pear.png",
    "img/7_peach.png",
    "img/8_pineapple.png",
    "img/9_melon.png",
    "img/10_watermelon.png",
];

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Ordinal size class of a fruit, `0..=MAX_RANK`.
///
/// Ranks are immutable after creation; a merge does not grow a fruit, it
/// despawns both reactants and spawns the successor rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(u8);

impl Rank {
    /// Build a rank, saturating at [`MAX_RANK`].
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_RANK))
    }

    /// Raw rank value.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The next rank up, or `None` at [`MAX_RANK`].
    pub fn succ(self) -> Option<Rank> {
        if self.0 < MAX_RANK {
            Some(Rank(self.0 + 1))
        } else {
            None
        }
    }

    /// Whether this is the terminal rank.
    #[inline]
    pub fn is_max(self) -> bool {
        self.0 == MAX_RANK
    }

    /// Body radius in pixels.
    pub fn radius(self) -> f64 {
        BASE_SIZE + f64::from(self.0) * RANK_STEP
    }

    /// Fallback fill color.
    pub fn color(self) -> &'static str {
        COLORS[usize::from(self.0)]
    }

    /// Points awarded when two fruits of this rank merge.
    pub fn score(self) -> u64 {
        SCORES[usize::from(self.0)]
    }

    /// Sprite path for the presentation layer.
    pub fn texture(self) -> &'static str {
        TEXTURES[usize::from(self.0)]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_strictly_monotonic() {
        for r in 0..MAX_RANK {
            assert!(
                Rank::new(r).radius() < Rank::new(r + 1).radius(),
                "radius must grow with rank, failed at {r}"
            );
        }
    }

    #[test]
    fn score_is_strictly_monotonic() {
        for r in 0..MAX_RANK {
            assert!(
                Rank::new(r).score() < Rank::new(r + 1).score(),
                "score must grow with rank, failed at {r}"
            );
        }
    }

    #[test]
    fn rank_saturates_at_max() {
        assert_eq!(Rank::new(200), Rank::new(MAX_RANK));
        assert!(Rank::new(MAX_RANK).is_max());
    }

    #[test]
    fn succ_stops_at_max() {
        assert_eq!(Rank::new(0).succ(), Some(Rank::new(1)));
        assert_eq!(Rank::new(MAX_RANK).succ(), None);
    }

    #[test]
    fn base_rank_dimensions() {
        assert_eq!(Rank::new(0).radius(), 10.0);
        assert_eq!(Rank::new(5).radius(), 55.0);
        assert_eq!(Rank::new(0).score(), 1);
        assert_eq!(Rank::new(MAX_RANK).score(), 66);
    }

    #[test]
    fn every_rank_has_color_and_texture() {
        for r in 0..=MAX_RANK {
            let rank = Rank::new(r);
            assert!(!rank.color().is_empty());
            assert!(rank.texture().ends_with(".png"));
        }
    }
}
