//! The merge-game rule engine.
//!
//! [`GameCore`] owns the physics world, the body tag side table, the falling
//! set, and all controller state. One instance is one game session; nothing
//! lives in module-level globals, so several cores can run side by side and
//! tests drive each one deterministically.
//!
//! Each [`GameCore::step`]:
//!
//! 1. clamps the fall speed of every in-flight fruit,
//! 2. advances the physics world one fixed timestep,
//! 3. reacts to the collision-started batch (hazards, merges),
//! 4. runs rim-overflow detection.
//!
//! Input entry points (`press_start`, `pointer_move`, `request_drop`,
//! `pull_pin`) are expected between steps on the same thread. Invalid input
//! is a silent no-op, never an error.

use std::collections::{BTreeSet, HashMap};

use fruitbox_physics::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Rank;
use crate::config::{
    DROP_COOLDOWN_SECS, FIXED_DT, GRAVITY_Y, MAX_FALL_VELOCITY, PlayfieldConfig, Variant,
};
use crate::layout;
use crate::rng::RankSource;

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Session lifecycle. Gameover is terminal until the next `init`; a win in
/// the Pin variant is a Gameover with the win status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Before the first `init`.
    Unready,
    /// Playfield built, waiting for start.
    Ready,
    /// Fruits active.
    Playable,
    /// Terminal. Start acts as reset.
    Gameover,
}

// ---------------------------------------------------------------------------
// BodyTag
// ---------------------------------------------------------------------------

/// What a physics body means to the rules. Untagged bodies are plain
/// geometry and never react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    /// A fruit of the given rank. Rank is immutable for the body's lifetime.
    Fruit(Rank),
    /// A removable pin (Pin variant).
    Pin,
    /// Burns fruits, absorbs water (Pin variant).
    Magma,
    /// Rolls around until the magma absorbs it (Pin variant).
    Water,
}

/// Invoked after every state transition, from the simulation thread.
pub type StateListener = Box<dyn FnMut(GameState)>;

// ---------------------------------------------------------------------------
// HudSnapshot
// ---------------------------------------------------------------------------

/// Presentation-facing summary of the session.
#[derive(Debug, Clone, Serialize)]
pub struct HudSnapshot {
    pub state: GameState,
    pub status: String,
    pub score: u64,
    pub fruit_count: usize,
    pub sim_time: f64,
}

// ---------------------------------------------------------------------------
// GameCore
// ---------------------------------------------------------------------------

/// One game session: physics world, tags, controller state, score.
pub struct GameCore {
    physics: PhysicsWorld,
    config: PlayfieldConfig,
    rank_source: Box<dyn RankSource>,
    state: GameState,
    score: u64,
    status: String,
    /// The fruit tracking the pointer, asleep until dropped.
    held: Option<BodyId>,
    /// The preview fruit, promoted to held on drop.
    next_up: Option<BodyId>,
    /// Last clamped pointer x; a promoted fruit snaps here.
    recent_x: f64,
    /// In-flight fruits. Entered on release or merge-spawn, left on the
    /// first collision.
    falling: BTreeSet<BodyId>,
    tags: HashMap<BodyId, BodyTag>,
    tick: u64,
    /// Drops are accepted once the sim clock reaches this deadline.
    drop_ready_at: f64,
    /// Cleared by game over; `step` is a no-op while false.
    running: bool,
    state_listener: Option<StateListener>,
}

impl GameCore {
    /// Build a core in the Unready state. Call [`init`](Self::init) to lay
    /// out the playfield.
    pub fn new(config: PlayfieldConfig, rank_source: Box<dyn RankSource>) -> Self {
        let recent_x = config.game_width / 2.0;
        Self {
            physics: PhysicsWorld::new(0.0, GRAVITY_Y),
            config,
            rank_source,
            state: GameState::Unready,
            score: 0,
            status: String::new(),
            held: None,
            next_up: None,
            recent_x,
            falling: BTreeSet::new(),
            tags: HashMap::new(),
            tick: 0,
            drop_ready_at: 0.0,
            running: false,
            state_listener: None,
        }
    }

    /// Register the presentation layer's state-change notifier. Called from
    /// the simulation thread on every transition.
    pub fn set_state_listener(&mut self, listener: StateListener) {
        self.state_listener = Some(listener);
    }

    // -- state machine ------------------------------------------------------

    /// Clear everything and rebuild the variant playfield. Leaves the core
    /// in Ready with the runner restarted.
    pub fn init(&mut self) {
        self.physics.clear();
        self.tags.clear();
        self.falling.clear();
        self.held = None;
        self.next_up = None;
        self.score = 0;
        self.tick = 0;
        self.drop_ready_at = 0.0;
        layout::build_playfield(&self.config, &mut self.physics, &mut self.tags);
        self.running = true;
        self.status = self.config.text_ready.to_string();
        self.set_state(GameState::Ready);
        info!(variant = ?self.config.variant, bodies = self.physics.body_count(), "playfield built");
    }

    /// The start/reset button. Ready starts play; Playable and Gameover
    /// reset to a fresh playfield.
    pub fn press_start(&mut self) {
        match self.state {
            GameState::Ready => self.start_game(),
            GameState::Playable | GameState::Gameover => self.init(),
            GameState::Unready => {}
        }
    }

    fn start_game(&mut self) {
        let held = self.spawn_held(self.recent_x);
        let next = self.spawn_held(self.config.next_pop_x());
        self.held = Some(held);
        self.next_up = Some(next);
        self.status = self.config.text_playing.to_string();
        self.set_state(GameState::Playable);
    }

    fn set_state(&mut self, next: GameState) {
        if self.state != next {
            self.state = next;
            info!(state = ?next, "state transition");
            if let Some(listener) = &mut self.state_listener {
                listener(next);
            }
        }
    }

    fn lose(&mut self) {
        self.running = false;
        self.status = self.config.text_gameover.to_string();
        self.set_state(GameState::Gameover);
    }

    fn win(&mut self) {
        self.running = false;
        self.status = self.config.text_win.to_string();
        self.set_state(GameState::Gameover);
    }

    // -- fruit factory ------------------------------------------------------

    /// A held-phase fruit: asleep, ReadyFruit category, random rank.
    fn spawn_held(&mut self, x: f64) -> BodyId {
        let rank = self.rank_source.next_rank();
        let body = self.physics.create_circle_body(
            x,
            self.config.pop_y(),
            rank.radius(),
            BodySpec {
                material: self.config.fruit_material(),
                filter: self.config.ready_fruit_filter(),
                is_static: false,
                start_asleep: true,
            },
        );
        self.tags.insert(body, BodyTag::Fruit(rank));
        body
    }

    /// A free fruit: awake, Fruit category, explicit rank. Skips the
    /// ReadyFruit phase entirely, like merge products and the Pin variant's
    /// pre-placed fruits.
    pub fn spawn_loose_fruit(&mut self, x: f64, y: f64, rank: Rank) -> BodyId {
        let body = self.physics.create_circle_body(
            x,
            y,
            rank.radius(),
            BodySpec {
                material: self.config.fruit_material(),
                filter: self.config.fruit_filter(),
                is_static: false,
                start_asleep: false,
            },
        );
        self.tags.insert(body, BodyTag::Fruit(rank));
        body
    }

    fn despawn(&mut self, body: BodyId) {
        self.physics.remove(body);
        self.tags.remove(&body);
    }

    // -- drop controller ----------------------------------------------------

    /// Track the pointer: clamp x into the held fruit's legal range, move it
    /// horizontally without waking it, remember the clamped x. Returns the
    /// position actually applied.
    pub fn pointer_move(&mut self, x: f64) -> f64 {
        if self.state != GameState::Playable {
            return self.recent_x;
        }
        self.recent_x = self.move_held(x);
        self.recent_x
    }

    fn move_held(&mut self, base_x: f64) -> f64 {
        let Some(held) = self.held else {
            return self.recent_x;
        };
        let Some(BodyTag::Fruit(rank)) = self.tags.get(&held).copied() else {
            return self.recent_x;
        };
        let clamped = self.config.clamp_x(base_x, rank);
        if let Some((_, y)) = self.physics.position(held) {
            self.physics.set_position(held, clamped, y);
        }
        clamped
    }

    /// Release the held fruit. No-op outside Playable or during the drop
    /// cooldown; rejected drops are not queued.
    pub fn request_drop(&mut self) {
        if self.state != GameState::Playable {
            return;
        }
        if self.sim_time() < self.drop_ready_at {
            return;
        }
        let Some(held) = self.held.take() else {
            return;
        };

        // Release: wake it and let it touch other fruits. The category
        // switch never reverts.
        self.physics.set_sleeping(held, false);
        self.physics.set_collision_filter(held, self.config.fruit_filter());
        self.falling.insert(held);
        debug!(body = %held, "fruit released");

        self.held = self.next_up.take();
        self.move_held(self.recent_x);
        self.next_up = Some(self.spawn_held(self.config.next_pop_x()));
        self.drop_ready_at = self.sim_time() + DROP_COOLDOWN_SECS;
    }

    /// Remove a pin from the field (Pin variant). Non-pin bodies and calls
    /// outside Playable are ignored.
    pub fn pull_pin(&mut self, body: BodyId) {
        if self.state != GameState::Playable {
            return;
        }
        if self.tags.get(&body) != Some(&BodyTag::Pin) {
            return;
        }
        debug!(body = %body, "pin pulled");
        self.despawn(body);
    }

    // -- simulation ---------------------------------------------------------

    /// Advance the session one fixed timestep. No-op once the runner has
    /// stopped.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        self.govern_fall_speed();
        let pairs = self.physics.step(FIXED_DT);
        self.tick += 1;
        self.react_to_collisions(&pairs);
        self.check_game_over();
    }

    /// Clamp the vertical speed of every in-flight fruit. Horizontal speed
    /// is untouched.
    fn govern_fall_speed(&mut self) {
        for &id in &self.falling {
            if let Some((vx, vy)) = self.physics.velocity(id) {
                let clamped = vy.clamp(-MAX_FALL_VELOCITY, MAX_FALL_VELOCITY);
                if clamped != vy {
                    self.physics.set_velocity(id, vx, clamped);
                }
            }
        }
    }

    /// Process one collision-started batch. Pairs arrive sorted from the
    /// physics world and are handled independently in that order.
    fn react_to_collisions(&mut self, pairs: &[CollisionPair]) {
        for pair in pairs {
            let (a, b) = (pair.body_a, pair.body_b);

            // First contact ends free fall, whatever the pair turns out to be.
            self.falling.remove(&a);
            self.falling.remove(&b);

            // An earlier pair in this batch may have consumed either body.
            if !self.physics.contains(a) || !self.physics.contains(b) {
                continue;
            }

            let tag_a = self.tags.get(&a).copied();
            let tag_b = self.tags.get(&b).copied();

            if tag_a == Some(BodyTag::Magma) || tag_b == Some(BodyTag::Magma) {
                self.react_to_magma(a, tag_a);
                self.react_to_magma(b, tag_b);
                continue;
            }

            if let (Some(BodyTag::Fruit(rank_a)), Some(BodyTag::Fruit(rank_b))) = (tag_a, tag_b) {
                if rank_a == rank_b {
                    self.merge(a, b, rank_a);
                }
            }
        }
    }

    /// One side of a magma contact. The magma body itself is inert.
    fn react_to_magma(&mut self, body: BodyId, tag: Option<BodyTag>) {
        match tag {
            Some(BodyTag::Water) => {
                debug!(body = %body, "magma absorbed water");
                self.despawn(body);
            }
            Some(BodyTag::Fruit(_)) => {
                debug!(body = %body, "magma burned a fruit");
                self.despawn(body);
                self.lose();
            }
            _ => {}
        }
    }

    /// Consume two same-rank fruits; spawn the successor at their midpoint.
    fn merge(&mut self, a: BodyId, b: BodyId, rank: Rank) {
        let (Some((ax, ay)), Some((bx, by))) = (self.physics.position(a), self.physics.position(b))
        else {
            return;
        };

        if self.config.score_enabled {
            self.score += rank.score();
        }
        self.despawn(a);
        self.despawn(b);

        match rank.succ() {
            None => {
                // Terminal merge. The Pin variant's goal is reached.
                debug!(rank = rank.get(), "terminal merge");
                if self.config.variant == Variant::Pin {
                    self.win();
                }
            }
            Some(next) => {
                let spawned =
                    self.spawn_loose_fruit((ax + bx) / 2.0, (ay + by) / 2.0, next);
                self.falling.insert(spawned);
                debug!(rank = next.get(), body = %spawned, "merged");
            }
        }
    }

    /// Rim overflow: a settled fruit whose top pokes above the box rim ends
    /// the game. Held, next-up, and in-flight fruits are exempt.
    fn check_game_over(&mut self) {
        if self.state != GameState::Playable {
            return;
        }
        let rim = self.config.rim_y();
        let mut overflow = false;
        for (&id, &tag) in &self.tags {
            let BodyTag::Fruit(rank) = tag else { continue };
            if self.falling.contains(&id) || Some(id) == self.held || Some(id) == self.next_up {
                continue;
            }
            if let Some((_, y)) = self.physics.position(id) {
                if y - rank.radius() < rim {
                    overflow = true;
                    break;
                }
            }
        }
        if overflow {
            info!("rim overflow");
            self.lose();
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Running score. Always 0 in the Pin variant.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Current status text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the step loop is live. Cleared by game over, restored by
    /// `init`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulation time in seconds, computed from the tick count to avoid
    /// accumulation drift.
    pub fn sim_time(&self) -> f64 {
        self.tick as f64 * FIXED_DT
    }

    /// The fruit under the pointer, if any.
    pub fn held(&self) -> Option<BodyId> {
        self.held
    }

    /// The preview fruit, if any.
    pub fn next_up(&self) -> Option<BodyId> {
        self.next_up
    }

    /// The tag attached to a body, if it has one.
    pub fn tag(&self, body: BodyId) -> Option<BodyTag> {
        self.tags.get(&body).copied()
    }

    /// Number of fruits currently in free fall.
    pub fn falling_count(&self) -> usize {
        self.falling.len()
    }

    /// The active configuration.
    pub fn config(&self) -> &PlayfieldConfig {
        &self.config
    }

    /// Every live fruit with its rank and position, in body-id order. The
    /// renderer draws from this.
    pub fn fruits(&self) -> Vec<(BodyId, Rank, (f64, f64))> {
        let mut out = Vec::new();
        for id in self.physics.bodies() {
            if let Some(BodyTag::Fruit(rank)) = self.tags.get(&id).copied() {
                if let Some(pos) = self.physics.position(id) {
                    out.push((id, rank, pos));
                }
            }
        }
        out
    }

    /// Every live pin, in body-id order.
    pub fn pins(&self) -> Vec<BodyId> {
        self.physics
            .bodies()
            .into_iter()
            .filter(|id| self.tags.get(id) == Some(&BodyTag::Pin))
            .collect()
    }

    /// Presentation snapshot.
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            state: self.state,
            status: self.status.clone(),
            score: self.score,
            fruit_count: self
                .tags
                .values()
                .filter(|tag| matches!(tag, BodyTag::Fruit(_)))
                .count(),
            sim_time: self.sim_time(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
