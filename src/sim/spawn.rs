//! Spawn scheduler
//!
//! Coins and bombs arrive on every `spawn_rate`-th tick; powerups roll
//! independently every tick. All draws come from the state's seeded RNG.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Body, Bomb, Coin, CoinTier, PowerUp};
use super::state::GameState;
use crate::consts::*;
use crate::settings::Settings;

/// What a spawn pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub coins: u32,
    pub bombs: u32,
    pub powerups: u32,
}

/// Run the spawn policy for the current tick
pub fn spawn(state: &mut GameState) -> SpawnReport {
    let mut report = SpawnReport::default();

    if state.tick % state.settings.spawn_rate == 0 {
        let coin_count = if state.rng.random_bool(state.settings.second_coin_chance) {
            2
        } else {
            1
        };
        for _ in 0..coin_count {
            let pos = spawn_point(&mut state.rng, &state.settings);
            let roll: f64 = state.rng.random();
            let tier = CoinTier::from_roll(
                roll,
                state.settings.bronze_weight,
                state.settings.silver_weight,
            );
            spawn_coin(state, pos, tier);
            report.coins += 1;
        }

        if state.rng.random_bool(state.settings.bomb_chance) {
            let pos = spawn_point(&mut state.rng, &state.settings);
            spawn_bomb(state, pos);
            report.bombs += 1;
        }
    }

    if state.rng.random_bool(state.settings.powerup_chance) {
        let pos = spawn_point(&mut state.rng, &state.settings);
        spawn_powerup(state, pos);
        report.powerups += 1;
    }

    report
}

/// Uniform point inside the spawn region:
/// `[margin, width - margin] x [margin, playable_height - bottom_reserve]`
pub fn spawn_point(rng: &mut Pcg32, settings: &Settings) -> Vec2 {
    let bounds = settings.playable_bounds();
    let margin = settings.spawn_margin;
    let x = rng.random_range(margin..=bounds.x - margin);
    let y = rng.random_range(margin..=bounds.y - settings.spawn_bottom_reserve);
    Vec2::new(x, y)
}

fn random_velocity(rng: &mut Pcg32, max_speed: f32) -> Vec2 {
    Vec2::new(
        rng.random_range(-max_speed..max_speed),
        rng.random_range(-max_speed..max_speed),
    )
}

/// Add a coin at `pos` with a random heading
pub fn spawn_coin(state: &mut GameState, pos: Vec2, tier: CoinTier) -> u32 {
    let id = state.next_entity_id();
    let vel = random_velocity(&mut state.rng, COIN_MAX_SPEED);
    let body = Body::new(pos, Vec2::splat(COIN_SIZE), vel, state.settings.playable_bounds());
    state
        .coins
        .push(Coin::new(id, body, tier, state.tick, state.settings.coin_lifetime_ticks));
    id
}

/// Add a bomb at `pos` with a random heading
pub fn spawn_bomb(state: &mut GameState, pos: Vec2) -> u32 {
    let id = state.next_entity_id();
    let vel = random_velocity(&mut state.rng, BOMB_MAX_SPEED);
    let body = Body::new(pos, Vec2::splat(BOMB_SIZE), vel, state.settings.playable_bounds());
    state.bombs.push(Bomb::new(
        id,
        body,
        state.tick,
        state.settings.bomb_lifetime_ticks,
        state.settings.bomb_penalty,
    ));
    id
}

/// Add a powerup at `pos` with a random heading
pub fn spawn_powerup(state: &mut GameState, pos: Vec2) -> u32 {
    let id = state.next_entity_id();
    let vel = random_velocity(&mut state.rng, POWERUP_MAX_SPEED);
    let body = Body::new(
        pos,
        Vec2::splat(POWERUP_SIZE),
        vel,
        state.settings.playable_bounds(),
    );
    state.powerups.push(PowerUp::new(
        id,
        body,
        state.tick,
        state.settings.powerup_lifetime_ticks,
    ));
    id
}
