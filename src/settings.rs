//! Game rules and tuning
//!
//! Every gameplay constant lives here so rounds can be retuned from a JSON
//! file without touching the simulation. `Default` reproduces the stock rules.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gameplay rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Board ===
    pub board_width: f32,
    pub board_height: f32,
    /// Strip along the bottom reserved for round controls (not playable)
    pub control_strip_height: f32,

    // === Spawning ===
    /// Coins and bombs spawn on ticks divisible by this
    pub spawn_rate: u64,
    /// Chance of a second coin on a spawn tick
    pub second_coin_chance: f64,
    /// Chance of a bomb on a spawn tick
    pub bomb_chance: f64,
    /// Chance of a powerup on any tick
    pub powerup_chance: f64,
    /// Distance kept from the left, right and top edges when spawning
    pub spawn_margin: f32,
    /// Distance kept from the bottom of the playable area when spawning
    pub spawn_bottom_reserve: f32,
    /// Cumulative tier weights (gold takes the remainder)
    pub bronze_weight: f64,
    pub silver_weight: f64,

    // === Lifetimes (ticks) ===
    pub coin_lifetime_ticks: u64,
    pub bomb_lifetime_ticks: u64,
    pub powerup_lifetime_ticks: u64,
    /// Autocollect duration after a powerup is clicked.
    /// Independent of `powerup_lifetime_ticks`.
    pub powerup_effect_ticks: u64,

    // === Round ===
    pub round_seconds: u32,
    pub ticks_per_second: u64,
    pub initial_lives: u8,
    pub bomb_penalty: u64,

    // === Feedback ===
    pub collect_feedback_ticks: u64,
    pub detonate_feedback_ticks: u64,

    // === Driver ===
    pub tick_secs: f32,
    pub max_substeps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            control_strip_height: CONTROL_STRIP_HEIGHT,

            spawn_rate: 10,
            second_coin_chance: 0.5,
            bomb_chance: 0.2,
            powerup_chance: 0.0005,
            spawn_margin: 25.0,
            spawn_bottom_reserve: 100.0,
            bronze_weight: 0.60,
            silver_weight: 0.25,

            coin_lifetime_ticks: 240,
            bomb_lifetime_ticks: 180,
            powerup_lifetime_ticks: 600,
            powerup_effect_ticks: 300,

            round_seconds: 60,
            ticks_per_second: TICKS_PER_SECOND,
            initial_lives: 3,
            bomb_penalty: 25,

            // 200 ms and 300 ms at 16 ms/tick
            collect_feedback_ticks: 12,
            detonate_feedback_ticks: 18,

            tick_secs: TICK_SECS,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl Settings {
    /// Playable area that entities bounce inside
    pub fn playable_bounds(&self) -> Vec2 {
        Vec2::new(
            self.board_width,
            self.board_height - self.control_strip_height,
        )
    }

    /// Clamp values that would otherwise break the loop (zero divisors,
    /// out-of-range or non-finite probabilities, spawn regions that invert).
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let unit = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };

        self.spawn_rate = self.spawn_rate.max(1);
        self.ticks_per_second = self.ticks_per_second.max(1);
        self.second_coin_chance = unit(self.second_coin_chance, defaults.second_coin_chance);
        self.bomb_chance = unit(self.bomb_chance, defaults.bomb_chance);
        self.powerup_chance = unit(self.powerup_chance, defaults.powerup_chance);
        self.bronze_weight = unit(self.bronze_weight, defaults.bronze_weight);
        self.silver_weight =
            unit(self.silver_weight, defaults.silver_weight).min(1.0 - self.bronze_weight);
        self.initial_lives = self.initial_lives.max(1);
        self.max_substeps = self.max_substeps.max(1);
        if !self.tick_secs.is_finite() || self.tick_secs <= 0.0 {
            self.tick_secs = defaults.tick_secs;
        }

        for (value, fallback) in [
            (&mut self.board_width, defaults.board_width),
            (&mut self.board_height, defaults.board_height),
            (&mut self.control_strip_height, defaults.control_strip_height),
            (&mut self.spawn_margin, defaults.spawn_margin),
            (&mut self.spawn_bottom_reserve, defaults.spawn_bottom_reserve),
        ] {
            if !value.is_finite() || *value < 0.0 {
                *value = fallback;
            }
        }
        self.control_strip_height = self.control_strip_height.min(self.board_height);

        // Keep y in [margin, height - reserve] and x in [margin, width - margin] non-empty
        let bounds = self.playable_bounds();
        let max_margin = bounds.x.min(bounds.y) / 2.0;
        self.spawn_margin = self.spawn_margin.min(max_margin);
        self.spawn_bottom_reserve = self
            .spawn_bottom_reserve
            .min(bounds.y - self.spawn_margin)
            .max(0.0);
        self
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
