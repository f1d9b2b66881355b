//! Collision categories and pair filters.
//!
//! Bodies carry a bit-flag category and a mask of categories they may touch.
//! Walls and floors are [`Category::BOX`], released fruits are
//! [`Category::FRUIT`], a held fruit is [`Category::READY_FRUIT`] (it passes
//! through everything except the box and released fruits until dropped), and
//! the Pin variant adds [`Category::PIN`] and the [`Category::GIMMICK`]
//! hazards.

use rapier2d::geometry::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A collision-category bitmask.
///
/// Categories combine with `|` to build masks:
///
/// ```
/// use fruitbox_physics::filter::Category;
///
/// let mask = Category::BOX | Category::FRUIT;
/// assert!(mask.intersects(Category::FRUIT));
/// assert!(!mask.intersects(Category::PIN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(pub u32);

impl Category {
    /// Static playfield geometry: walls, floors, guards, slopes.
    pub const BOX: Category = Category(0x0001);
    /// A fruit released into free simulation.
    pub const FRUIT: Category = Category(0x0002);
    /// A held fruit, not yet released. Collides only with BOX and FRUIT
    /// (plus PIN in the Pin variant).
    pub const READY_FRUIT: Category = Category(0x0004);
    /// A removable pin (Pin variant).
    pub const PIN: Category = Category(0x0008);
    /// Reserved for a pointer constraint owned by the presentation layer.
    pub const MOUSE: Category = Category(0x0010);
    /// Hazard bodies: magma and water (Pin variant).
    pub const GIMMICK: Category = Category(0x0020);
    /// Every category bit set.
    pub const ALL: Category = Category(u32::MAX);

    /// Whether any bit is shared with `other`.
    #[inline]
    pub fn intersects(self, other: Category) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for Category {
    type Output = Category;

    #[inline]
    fn bitor(self, rhs: Category) -> Category {
        Category(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// CollisionFilter
// ---------------------------------------------------------------------------

/// What a body is (`category`) and what it may touch (`mask`).
///
/// Two bodies generate contacts only if each body's category intersects the
/// other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    /// The category bit(s) this body belongs to.
    pub category: Category,
    /// The categories this body collides with.
    pub mask: Category,
}

impl CollisionFilter {
    /// Build a filter from a category and a mask.
    pub fn new(category: Category, mask: Category) -> Self {
        Self { category, mask }
    }

    /// The default filter for static playfield geometry: BOX, touches
    /// everything.
    pub fn solid() -> Self {
        Self {
            category: Category::BOX,
            mask: Category::ALL,
        }
    }

    /// Convert to rapier's interaction-group representation.
    pub(crate) fn to_interaction_groups(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.category.0),
            Group::from_bits_truncate(self.mask.0),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
