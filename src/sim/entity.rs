//! Board entities
//!
//! Every simulated object is a `Body` (center, footprint, per-tick velocity,
//! board bounds) wrapped by a variant that adds its own lifecycle. Collision
//! treats every footprint as a circle of radius `width / 2`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rgb;
use crate::consts::*;

/// Shared geometry and motion state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position (board-relative)
    pub pos: Vec2,
    /// Footprint (w, h), used for wall bounce and collision radius
    pub extent: Vec2,
    /// Per-tick displacement
    pub vel: Vec2,
    /// Playable area the body is confined to
    pub bounds: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, extent: Vec2, vel: Vec2, bounds: Vec2) -> Self {
        Self {
            pos,
            extent,
            vel,
            bounds,
        }
    }

    /// Collision radius (circle approximation on width)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.extent.x / 2.0
    }

    /// Advance by velocity and bounce off the walls
    pub fn bounce_step(&mut self) {
        let (pos, vel) = apply_wall_bounce(self.pos, self.vel, self.extent, self.bounds);
        self.pos = pos;
        self.vel = vel;
    }
}

/// Advance `pos` by `vel`, then reflect and clamp on every axis where the
/// footprint crosses `[0, bounds]`. Axes are handled independently.
pub fn apply_wall_bounce(pos: Vec2, vel: Vec2, extent: Vec2, bounds: Vec2) -> (Vec2, Vec2) {
    let (x, vx) = bounce_axis(pos.x, vel.x, extent.x, bounds.x);
    let (y, vy) = bounce_axis(pos.y, vel.y, extent.y, bounds.y);
    (Vec2::new(x, y), Vec2::new(vx, vy))
}

#[inline]
fn bounce_axis(p: f32, v: f32, extent: f32, bound: f32) -> (f32, f32) {
    let p = p + v;
    let half = extent / 2.0;
    if p - half < 0.0 || p + half > bound {
        // Board narrower than the footprint: pin to the low edge
        let hi = (bound - half).max(half);
        (p.clamp(half, hi), -v)
    } else {
        (p, v)
    }
}

/// Circle overlap: center distance below the (scaled) sum of radii
#[inline]
pub fn circles_overlap(a: &Body, b: &Body, scale: f32) -> bool {
    a.pos.distance(b.pos) < (a.radius() + b.radius()) * scale
}

/// Inclusive axis-aligned bounding box point test
#[inline]
pub fn box_contains(body: &Body, point: Vec2) -> bool {
    let half = body.extent / 2.0;
    point.x >= body.pos.x - half.x
        && point.x <= body.pos.x + half.x
        && point.y >= body.pos.y - half.y
        && point.y <= body.pos.y + half.y
}

/// Inclusive point-in-circle test
#[inline]
pub fn circle_contains(body: &Body, point: Vec2) -> bool {
    let r = body.radius();
    body.pos.distance_squared(point) <= r * r
}

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Coin,
    Bomb,
    PowerUp,
    Purse,
}

/// Capability contract shared by all entity variants
pub trait Entity {
    fn body(&self) -> &Body;

    fn kind(&self) -> EntityKind;

    /// Advance one tick
    fn step(&mut self);

    /// Shape-vs-shape overlap
    fn collides_with(&self, other: &Body) -> bool {
        circles_overlap(self.body(), other, 1.0)
    }

    /// Point containment (click hit test)
    fn contains_point(&self, point: Vec2) -> bool {
        box_contains(self.body(), point)
    }
}

/// Coin tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinTier {
    Gold,
    Silver,
    Bronze,
}

impl CoinTier {
    pub fn points(&self) -> u64 {
        match self {
            CoinTier::Gold => 10,
            CoinTier::Silver => 5,
            CoinTier::Bronze => 2,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            CoinTier::Gold => [255, 215, 0],
            CoinTier::Silver => [192, 192, 192],
            CoinTier::Bronze => [205, 127, 50],
        }
    }

    /// Pick a tier from one uniform roll in [0, 1) using cumulative weights
    pub fn from_roll(roll: f64, bronze_weight: f64, silver_weight: f64) -> Self {
        if roll < bronze_weight {
            CoinTier::Bronze
        } else if roll < bronze_weight + silver_weight {
            CoinTier::Silver
        } else {
            CoinTier::Gold
        }
    }
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub body: Body,
    pub tier: CoinTier,
    pub collected: bool,
    pub created_tick: u64,
    pub lifetime_ticks: u64,
}

impl Coin {
    pub fn new(id: u32, body: Body, tier: CoinTier, created_tick: u64, lifetime_ticks: u64) -> Self {
        Self {
            id,
            body,
            tier,
            collected: false,
            created_tick,
            lifetime_ticks,
        }
    }

    pub fn points(&self) -> u64 {
        self.tier.points()
    }

    /// Mark collected (one-way)
    pub fn collect(&mut self) {
        self.collected = true;
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_tick) >= self.lifetime_ticks
    }

    /// Still on the board and collectible
    pub fn is_live(&self, now: u64) -> bool {
        !self.collected && !self.is_expired(now)
    }
}

impl Entity for Coin {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Coin
    }

    fn step(&mut self) {
        self.body.bounce_step();
    }
}

/// A hazard that costs points and a life when the purse grabs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    pub body: Body,
    pub detonated: bool,
    /// Explosion animation progress, advanced once per draw
    pub explosion_frame: u32,
    pub created_tick: u64,
    pub lifetime_ticks: u64,
    pub penalty: u64,
}

impl Bomb {
    pub fn new(id: u32, body: Body, created_tick: u64, lifetime_ticks: u64, penalty: u64) -> Self {
        Self {
            id,
            body,
            detonated: false,
            explosion_frame: 0,
            created_tick,
            lifetime_ticks,
            penalty,
        }
    }

    pub fn color() -> Rgb {
        [150, 50, 50]
    }

    /// Trigger the explosion (one-way)
    pub fn detonate(&mut self) {
        self.detonated = true;
        self.explosion_frame = 0;
    }

    /// Advance the explosion animation by one draw
    pub fn advance_explosion(&mut self) {
        if self.detonated && self.explosion_frame < EXPLOSION_FRAMES {
            self.explosion_frame += 1;
        }
    }

    pub fn is_detonation_complete(&self) -> bool {
        self.detonated && self.explosion_frame >= EXPLOSION_FRAMES
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_tick) >= self.lifetime_ticks
    }

    /// Still armed and on the board
    pub fn is_live(&self, now: u64) -> bool {
        !self.detonated && !self.is_expired(now)
    }
}

impl Entity for Bomb {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Bomb
    }

    fn step(&mut self) {
        if !self.detonated {
            self.body.bounce_step();
        }
    }
}

/// A rare pickup that enables autocollect when clicked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub body: Body,
    pub created_tick: u64,
    pub lifetime_ticks: u64,
    pub active: bool,
    pub activation_tick: u64,
}

impl PowerUp {
    pub fn new(id: u32, body: Body, created_tick: u64, lifetime_ticks: u64) -> Self {
        Self {
            id,
            body,
            created_tick,
            lifetime_ticks,
            active: false,
            activation_tick: 0,
        }
    }

    pub fn color() -> Rgb {
        [100, 255, 200]
    }

    pub fn activate(&mut self, now: u64) {
        self.active = true;
        self.activation_tick = now;
    }

    /// Whether this pickup's own activation window has run out
    pub fn is_effect_over(&self, now: u64) -> bool {
        self.active && now.saturating_sub(self.activation_tick) >= self.lifetime_ticks
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_tick) >= self.lifetime_ticks
    }
}

impl Entity for PowerUp {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::PowerUp
    }

    fn step(&mut self) {
        self.body.bounce_step();
    }

    fn contains_point(&self, point: Vec2) -> bool {
        circle_contains(&self.body, point)
    }
}

/// Purse feedback flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Collected,
    Detonated,
}

impl FeedbackKind {
    pub fn color(&self) -> Rgb {
        match self {
            FeedbackKind::Collected => [0, 255, 0],
            FeedbackKind::Detonated => [255, 100, 100],
        }
    }
}

/// Transient purse highlight, interpreted by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

impl Feedback {
    pub fn is_active(&self, now: u64) -> bool {
        now.saturating_sub(self.start_tick) < self.duration_ticks
    }
}

/// The player's collection purse, driven by the pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purse {
    pub body: Body,
    pub feedback: Option<Feedback>,
}

impl Purse {
    /// Purse at the center of the playable area
    pub fn new(bounds: Vec2) -> Self {
        Self {
            body: Body::new(bounds / 2.0, Vec2::splat(PURSE_SIZE), Vec2::ZERO, bounds),
            feedback: None,
        }
    }

    pub fn base_color() -> Rgb {
        [100, 150, 255]
    }

    /// Move to the pointer, clamped so the purse stays on the board
    pub fn follow_pointer(&mut self, pointer: Vec2) {
        let half = self.body.extent / 2.0;
        let hi = (self.body.bounds - half).max(half);
        self.body.pos = pointer.clamp(half, hi);
    }

    /// Enlarged collection test (1.5x the plain circle reach)
    pub fn reaches(&self, other: &Body) -> bool {
        circles_overlap(&self.body, other, PURSE_REACH)
    }

    pub fn flash(&mut self, kind: FeedbackKind, now: u64, duration_ticks: u64) {
        self.feedback = Some(Feedback {
            kind,
            start_tick: now,
            duration_ticks,
        });
    }

    /// Current purse color (feedback reverts on its own)
    pub fn highlight(&self, now: u64) -> Rgb {
        match self.feedback {
            Some(fb) if fb.is_active(now) => fb.kind.color(),
            _ => Self::base_color(),
        }
    }
}

impl Entity for Purse {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Purse
    }

    /// Pointer-driven; never moves on its own
    fn step(&mut self) {}

    fn collides_with(&self, other: &Body) -> bool {
        self.reaches(other)
    }
}

/// Borrowed view over any entity, for uniform iteration
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Coin(&'a Coin),
    Bomb(&'a Bomb),
    PowerUp(&'a PowerUp),
    Purse(&'a Purse),
}

impl<'a> EntityRef<'a> {
    fn as_entity(&self) -> &'a dyn Entity {
        match *self {
            EntityRef::Coin(c) => c,
            EntityRef::Bomb(b) => b,
            EntityRef::PowerUp(p) => p,
            EntityRef::Purse(p) => p,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.as_entity().kind()
    }

    pub fn body(&self) -> &'a Body {
        self.as_entity().body()
    }

    pub fn collides_with(&self, other: &Body) -> bool {
        self.as_entity().collides_with(other)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.as_entity().contains_point(point)
    }
}
