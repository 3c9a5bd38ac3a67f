//! Gold Rush - A coin-collecting arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, round state)
//! - `game`: Round driver that reports final scores to a ledger
//! - `driver`: Fixed-timestep tick driver and buffered host input
//! - `render`: Frame snapshots and asset lookup for a host renderer
//! - `ledger`: Score history persistence
//! - `settings`: Data-driven game rules

pub mod driver;
pub mod game;
pub mod ledger;
pub mod render;
pub mod settings;
pub mod sim;

pub use driver::{InputQueue, TickDriver};
pub use game::Game;
pub use ledger::{JsonFileLedger, LedgerError, MemoryLedger, ScoreHistory, ScoreLedger};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (16 ms, ~60 Hz)
    pub const TICK_SECS: f32 = 0.016;
    /// Ticks that make up one countdown second
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board dimensions (the control strip sits along the bottom)
    pub const BOARD_WIDTH: f32 = 800.0;
    pub const BOARD_HEIGHT: f32 = 600.0;
    pub const CONTROL_STRIP_HEIGHT: f32 = 50.0;
    pub const PLAYABLE_HEIGHT: f32 = BOARD_HEIGHT - CONTROL_STRIP_HEIGHT;

    /// Entity footprints
    pub const COIN_SIZE: f32 = 15.0;
    pub const BOMB_SIZE: f32 = 50.0;
    pub const POWERUP_SIZE: f32 = 50.0;
    pub const PURSE_SIZE: f32 = 25.0;

    /// Max initial speed per axis (velocity drawn from -max..max)
    pub const COIN_MAX_SPEED: f32 = 3.0;
    pub const BOMB_MAX_SPEED: f32 = 2.0;
    pub const POWERUP_MAX_SPEED: f32 = 5.0;

    /// Purse reach multiplier over the plain circle test
    pub const PURSE_REACH: f32 = 1.5;

    /// Bomb explosion animation length (draw frames)
    pub const EXPLOSION_FRAMES: u32 = 10;
}

/// RGB color used for entity visuals
pub type Rgb = [u8; 3];
