//! Round state and core simulation types
//!
//! `GameState` owns every entity collection and round counter. Only the tick
//! loop and the round controls mutate it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Bomb, Coin, CoinTier, EntityRef, PowerUp, Purse};
use crate::settings::Settings;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for start; board is empty
    Idle,
    /// Active gameplay
    Running,
    /// Frozen: no spawning, movement, collisions or countdown
    Paused,
    /// Round over (time up or out of lives)
    Ended,
}

/// External round controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundControl {
    /// Idle/Ended -> Running, with a fresh board
    Start,
    /// Running <-> Paused
    TogglePause,
    /// Any -> Idle, with a fresh board
    Reset,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEndReason {
    TimeUp,
    LivesExhausted,
}

/// Things that happened during a tick, for the host (audio, HUD, logs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    CoinCollected { tier: CoinTier, points: u64 },
    BombDetonated { penalty: u64, lives_left: u8 },
    PowerUpActivated { until_tick: u64 },
    PowerUpExpired,
    SecondElapsed { remaining: u32 },
    RoundEnded { score: u64, reason: RoundEndReason },
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    /// Rules in effect
    pub settings: Settings,
    /// Spawn RNG
    pub(crate) rng: Pcg32,
    /// Current phase
    pub phase: RoundPhase,
    /// Score (never negative)
    pub score: u64,
    /// Player lives
    pub lives: u8,
    /// Countdown shown to the player
    pub remaining_seconds: u32,
    /// Simulation tick counter (reset each round)
    pub tick: u64,
    /// Autocollect effect running
    pub powerup_active: bool,
    /// Tick at which autocollect stops
    pub powerup_end_tick: u64,
    /// Player purse
    pub purse: Purse,
    /// Active coins (in spawn order)
    pub coins: Vec<Coin>,
    /// Active bombs (in spawn order)
    pub bombs: Vec<Bomb>,
    /// Active powerups (in spawn order)
    pub powerups: Vec<PowerUp>,
    /// Events pending since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle state with default rules
    pub fn new(seed: u64) -> Self {
        Self::with_settings(Settings::default(), seed)
    }

    /// Create an idle state with the given rules
    pub fn with_settings(settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let purse = Purse::new(settings.playable_bounds());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RoundPhase::Idle,
            score: 0,
            lives: settings.initial_lives,
            remaining_seconds: settings.round_seconds,
            tick: 0,
            powerup_active: false,
            powerup_end_tick: 0,
            purse,
            coins: Vec::new(),
            bombs: Vec::new(),
            powerups: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RoundPhase::Paused
    }

    /// Apply a round control. Returns false when it was not valid here.
    pub fn apply_control(&mut self, control: RoundControl) -> bool {
        match control {
            RoundControl::Start => self.start(),
            RoundControl::TogglePause => self.toggle_pause(),
            RoundControl::Reset => self.reset(),
        }
    }

    /// Start a fresh round (only from Idle or Ended)
    pub fn start(&mut self) -> bool {
        match self.phase {
            RoundPhase::Idle | RoundPhase::Ended => {
                self.reinitialize();
                self.phase = RoundPhase::Running;
                self.events.push(GameEvent::RoundStarted);
                log::info!("Round started (seed {})", self.seed);
                true
            }
            RoundPhase::Running | RoundPhase::Paused => false,
        }
    }

    /// Toggle pause (only while Running or Paused)
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            RoundPhase::Running => {
                self.phase = RoundPhase::Paused;
                true
            }
            RoundPhase::Paused => {
                self.phase = RoundPhase::Running;
                true
            }
            RoundPhase::Idle | RoundPhase::Ended => false,
        }
    }

    /// Force back to Idle with a fresh board
    pub fn reset(&mut self) -> bool {
        self.reinitialize();
        self.phase = RoundPhase::Idle;
        true
    }

    fn reinitialize(&mut self) {
        self.score = 0;
        self.lives = self.settings.initial_lives;
        self.remaining_seconds = self.settings.round_seconds;
        self.tick = 0;
        self.powerup_active = false;
        self.powerup_end_tick = 0;
        self.coins.clear();
        self.bombs.clear();
        self.powerups.clear();
        self.purse = Purse::new(self.settings.playable_bounds());
    }

    /// Running -> Ended
    pub(crate) fn end_round(&mut self, reason: RoundEndReason) {
        if self.phase != RoundPhase::Running {
            return;
        }
        self.phase = RoundPhase::Ended;
        self.events.push(GameEvent::RoundEnded {
            score: self.score,
            reason,
        });
        log::info!(
            "Round ended ({:?}) at tick {} with score {}",
            reason,
            self.tick,
            self.score
        );
    }

    /// Turn on autocollect for `powerup_effect_ticks` from now
    pub(crate) fn start_autocollect(&mut self) {
        self.powerup_active = true;
        self.powerup_end_tick = self.tick + self.settings.powerup_effect_ticks;
        self.events.push(GameEvent::PowerUpActivated {
            until_tick: self.powerup_end_tick,
        });
        log::debug!("Autocollect on until tick {}", self.powerup_end_tick);
    }

    /// Ticks of autocollect left (0 when inactive)
    pub fn powerup_ticks_left(&self) -> u64 {
        if self.powerup_active {
            self.powerup_end_tick.saturating_sub(self.tick)
        } else {
            0
        }
    }

    /// Whole seconds of autocollect left, for the HUD timer
    pub fn powerup_seconds_left(&self) -> u64 {
        self.powerup_ticks_left() / self.settings.ticks_per_second
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every entity on the board, purse last
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.coins
            .iter()
            .map(EntityRef::Coin)
            .chain(self.bombs.iter().map(EntityRef::Bomb))
            .chain(self.powerups.iter().map(EntityRef::PowerUp))
            .chain(std::iter::once(EntityRef::Purse(&self.purse)))
    }
}
