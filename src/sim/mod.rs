//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-counted timing only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{autocollect, resolve_click, resolve_coin_collisions, resolve_elastic};
pub use entity::{
    Body, Bomb, Coin, CoinTier, Entity, EntityKind, EntityRef, Feedback, FeedbackKind, PowerUp,
    Purse, apply_wall_bounce, box_contains, circle_contains, circles_overlap,
};
pub use spawn::{SpawnReport, spawn};
pub use state::{GameEvent, GameState, RoundControl, RoundEndReason, RoundPhase};
pub use tick::{TickInput, autopilot, tick};
