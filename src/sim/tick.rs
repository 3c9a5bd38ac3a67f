//! Fixed timestep simulation tick
//!
//! Core game loop that advances a round deterministically. One call is one
//! tick; real-time pacing belongs to the driver.

use glam::Vec2;

use super::collision::{autocollect, resolve_click, resolve_coin_collisions};
use super::entity::Entity;
use super::spawn::spawn;
use super::state::{GameEvent, GameState, RoundControl, RoundEndReason, RoundPhase};
use crate::consts::*;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position (board coordinates)
    pub pointer: Option<Vec2>,
    /// Clicks since the previous tick, in arrival order
    pub clicks: Vec<Vec2>,
    /// Round controls pressed since the previous tick, in arrival order
    pub controls: Vec<RoundControl>,
    /// Idle/demo mode - autopilot plays the round
    pub idle_mode: bool,
}

impl TickInput {
    /// Fold a later input into this one (pointer: latest wins)
    pub fn merge(&mut self, later: TickInput) {
        if later.pointer.is_some() {
            self.pointer = later.pointer;
        }
        self.clicks.extend(later.clicks);
        self.controls.extend(later.controls);
        self.idle_mode |= later.idle_mode;
    }

    pub fn is_empty(&self) -> bool {
        self.pointer.is_none() && self.clicks.is_empty() && self.controls.is_empty()
    }
}

/// Advance the round by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    for &control in &input.controls {
        state.apply_control(control);
    }

    let autopilot_input;
    let input = if input.idle_mode && state.is_running() {
        autopilot_input = autopilot(state);
        &autopilot_input
    } else {
        input
    };

    if let Some(pointer) = input.pointer {
        if matches!(state.phase, RoundPhase::Running | RoundPhase::Paused) {
            state.purse.follow_pointer(pointer);
        }
    }

    // Don't tick unless running
    if state.phase != RoundPhase::Running {
        return;
    }

    state.tick += 1;
    let now = state.tick;

    // Countdown
    if now % state.settings.ticks_per_second == 0 {
        state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
        state.events.push(GameEvent::SecondElapsed {
            remaining: state.remaining_seconds,
        });
        if state.remaining_seconds == 0 {
            state.end_round(RoundEndReason::TimeUp);
            return;
        }
    }

    spawn(state);

    for coin in state.coins.iter_mut().filter(|c| c.is_live(now)) {
        coin.step();
    }
    for bomb in state.bombs.iter_mut().filter(|b| b.is_live(now)) {
        bomb.step();
    }
    for powerup in state.powerups.iter_mut().filter(|p| !p.is_expired(now)) {
        powerup.step();
    }

    resolve_coin_collisions(&mut state.coins, now);

    for &click in &input.clicks {
        if state.phase != RoundPhase::Running {
            break;
        }
        resolve_click(state, click);
    }
    if state.phase != RoundPhase::Running {
        return;
    }

    autocollect(state);

    // Purge terminal entities
    state.coins.retain(|c| c.is_live(now));
    state
        .bombs
        .retain(|b| !b.is_detonation_complete() && !b.is_expired(now));
    state.powerups.retain(|p| !p.is_expired(now));
}

/// Pointer speed limit for the autopilot (pixels per tick)
const AUTOPILOT_POINTER_SPEED: f32 = 12.0;

/// Demo player: chase powerups first, then the nearest coin that is not
/// sitting next to a bomb, clicking once the purse is in reach.
pub fn autopilot(state: &GameState) -> TickInput {
    let now = state.tick;
    let purse = state.purse.body.pos;
    let shielded = state.powerup_active;

    let bomb_near = |p: Vec2| {
        !shielded
            && state.bombs.iter().any(|b| {
                b.is_live(now)
                    && b.body.pos.distance(p) < (b.body.radius() + PURSE_SIZE / 2.0) * PURSE_REACH + 5.0
            })
    };
    let by_distance = |a: &Vec2, b: &Vec2| {
        a.distance(purse)
            .partial_cmp(&b.distance(purse))
            .unwrap_or(std::cmp::Ordering::Equal)
    };

    let powerup = state
        .powerups
        .iter()
        .filter(|p| !p.is_expired(now))
        .map(|p| (p.body.pos, p.body.radius()))
        .min_by(|a, b| by_distance(&a.0, &b.0));

    let mut input = TickInput::default();

    if let Some((target, radius)) = powerup {
        let pointer = purse + (target - purse).clamp_length_max(AUTOPILOT_POINTER_SPEED);
        input.pointer = Some(pointer);
        if pointer.distance(target) <= radius * 0.5 {
            input.clicks.push(pointer);
        }
        return input;
    }

    let coin = state
        .coins
        .iter()
        .filter(|c| c.is_live(now) && !bomb_near(c.body.pos))
        .map(|c| c.body.pos)
        .min_by(by_distance);

    if let Some(target) = coin {
        let pointer = purse + (target - purse).clamp_length_max(AUTOPILOT_POINTER_SPEED);
        input.pointer = Some(pointer);
        let reach = (PURSE_SIZE + COIN_SIZE) / 2.0 * PURSE_REACH;
        if !shielded && pointer.distance(target) < reach * 0.8 && !bomb_near(pointer) {
            input.clicks.push(pointer);
        }
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entity::{Body, Bomb, Coin, CoinTier, EntityKind};
    use crate::sim::spawn::{spawn_bomb, spawn_coin};

    fn quiet_settings() -> Settings {
        Settings {
            second_coin_chance: 0.0,
            bomb_chance: 0.0,
            powerup_chance: 0.0,
            ..Default::default()
        }
    }

    fn run(state: &mut GameState, ticks: u32) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    #[test]
    fn test_idle_does_not_tick() {
        let mut state = GameState::new(1);
        run(&mut state, 100);
        assert_eq!(state.tick, 0);
        assert!(state.coins.is_empty());
    }

    #[test]
    fn test_start_control_then_first_spawn() {
        let mut state = GameState::new(12345);
        let start = TickInput {
            controls: vec![RoundControl::Start],
            ..Default::default()
        };
        tick(&mut state, &start);
        assert_eq!(state.phase, RoundPhase::Running);
        assert_eq!(state.tick, 1);

        run(&mut state, 8);
        assert!(state.coins.is_empty());
        run(&mut state, 1);
        assert_eq!(state.tick, 10);
        assert!((1..=2).contains(&state.coins.len()));
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);
        state.start();
        run(&mut state, 15);
        let frozen: Vec<Vec2> = state.coins.iter().map(|c| c.body.pos).collect();

        let pause = TickInput {
            controls: vec![RoundControl::TogglePause],
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, RoundPhase::Paused);
        run(&mut state, 300);
        assert_eq!(state.tick, 15);
        assert_eq!(state.remaining_seconds, 60);
        let after: Vec<Vec2> = state.coins.iter().map(|c| c.body.pos).collect();
        assert_eq!(frozen, after);

        // Pointer still moves the purse while paused
        let pointer = TickInput {
            pointer: Some(Vec2::new(50.0, 60.0)),
            ..Default::default()
        };
        tick(&mut state, &pointer);
        assert_eq!(state.purse.body.pos, Vec2::new(50.0, 60.0));

        tick(&mut state, &pause);
        assert_eq!(state.phase, RoundPhase::Running);
        assert_eq!(state.tick, 16);
    }

    #[test]
    fn test_countdown_ends_round_once() {
        let mut state = GameState::with_settings(quiet_settings(), 8);
        state.start();
        run(&mut state, 59);
        assert_eq!(state.remaining_seconds, 60);
        run(&mut state, 1);
        assert_eq!(state.remaining_seconds, 59);

        run(&mut state, 3540);
        assert_eq!(state.tick, 3600);
        assert_eq!(state.remaining_seconds, 0);
        assert_eq!(state.phase, RoundPhase::Ended);

        run(&mut state, 500);
        assert_eq!(state.tick, 3600);
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { reason: RoundEndReason::TimeUp, .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_entities_stay_on_board() {
        let settings = Settings {
            bomb_chance: 1.0,
            powerup_chance: 0.05,
            ..Default::default()
        };
        let mut state = GameState::with_settings(settings, 2024);
        state.start();
        for _ in 0..1500 {
            tick(&mut state, &TickInput::default());
            // Coin separation may nudge a coin past a wall until its next move
            for e in state.entities().filter(|e| e.kind() != EntityKind::Coin) {
                let body = e.body();
                let half = body.extent / 2.0;
                assert!(body.pos.x >= half.x - 1e-3 && body.pos.x <= body.bounds.x - half.x + 1e-3);
                assert!(body.pos.y >= half.y - 1e-3 && body.pos.y <= body.bounds.y - half.y + 1e-3);
            }
        }
    }

    #[test]
    fn test_coins_expire_after_lifetime() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        run(&mut state, 10);
        let first = state.coins[0].id;
        // Spawned at tick 10, gone by tick 250
        run(&mut state, 239);
        assert!(state.coins.iter().any(|c| c.id == first));
        run(&mut state, 1);
        assert!(state.coins.iter().all(|c| c.id != first));
    }

    #[test]
    fn test_expired_bomb_removed_without_penalty() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let pos = Vec2::new(700.0, 100.0);
        spawn_bomb(&mut state, pos);
        state.score = 40;
        run(&mut state, 180);
        assert!(state.bombs.is_empty());
        assert_eq!(state.lives, 3);
        assert!(state.score >= 40);
    }

    #[test]
    fn test_detonated_bomb_waits_for_explosion() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let mut bomb = Bomb::new(
            99,
            Body::new(Vec2::new(600.0, 100.0), Vec2::splat(50.0), Vec2::ZERO, state.settings.playable_bounds()),
            0,
            180,
            25,
        );
        bomb.detonate();
        state.bombs.push(bomb);
        run(&mut state, 5);
        assert_eq!(state.bombs.len(), 1);
        for _ in 0..EXPLOSION_FRAMES {
            state.bombs[0].advance_explosion();
        }
        run(&mut state, 1);
        assert!(state.bombs.is_empty());
    }

    #[test]
    fn test_click_in_tick_scores() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let pos = Vec2::new(300.0, 300.0);
        spawn_coin(&mut state, pos, CoinTier::Gold);
        state.coins[0].body.vel = Vec2::ZERO;
        let click = TickInput {
            clicks: vec![pos],
            ..Default::default()
        };
        tick(&mut state, &click);
        assert_eq!(state.score, 10);
        assert!(state.coins.is_empty());
    }

    #[test]
    fn test_detonating_last_life_stops_tick() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        state.lives = 1;
        let pos = Vec2::new(300.0, 300.0);
        spawn_bomb(&mut state, pos);
        state.bombs[0].body.vel = Vec2::ZERO;
        let click = TickInput {
            clicks: vec![pos, pos],
            ..Default::default()
        };
        tick(&mut state, &click);
        assert_eq!(state.phase, RoundPhase::Ended);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_coin_pair_bounces_in_tick() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let bounds = state.settings.playable_bounds();
        for (id, x, vx) in [(1, 100.0, 2.0), (2, 112.0, -2.0)] {
            let body = Body::new(Vec2::new(x, 200.0), Vec2::splat(COIN_SIZE), Vec2::new(vx, 0.0), bounds);
            state.coins.push(Coin::new(id, body, CoinTier::Bronze, 0, 240));
        }
        tick(&mut state, &TickInput::default());
        assert!(state.coins[0].body.vel.x < 0.0);
        assert!(state.coins[1].body.vel.x > 0.0);
        assert!(state.coins[0].body.pos.distance(state.coins[1].body.pos) >= COIN_SIZE - 1e-3);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.start();
        state2.start();

        let inputs = [
            TickInput {
                pointer: Some(Vec2::new(200.0, 200.0)),
                ..Default::default()
            },
            TickInput {
                clicks: vec![Vec2::new(200.0, 200.0)],
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..200 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.tick, state2.tick);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.coins.len(), state2.coins.len());
        for (a, b) in state1.coins.iter().zip(&state2.coins) {
            assert_eq!(a.body.pos, b.body.pos);
        }
    }

    #[test]
    fn test_autopilot_scores() {
        let mut state = GameState::new(4242);
        state.start();
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..1200 {
            tick(&mut state, &idle);
        }
        assert!(state.score > 0);
    }

    #[test]
    fn test_autopilot_avoids_bomb_clicks() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let pos = state.purse.body.pos;
        spawn_coin(&mut state, pos, CoinTier::Gold);
        spawn_bomb(&mut state, pos + Vec2::new(10.0, 0.0));
        let input = autopilot(&state);
        assert!(input.clicks.is_empty());
    }

    #[test]
    fn test_coins_bounce_before_click_collects() {
        let mut state = GameState::with_settings(quiet_settings(), 3);
        state.start();
        let bounds = state.settings.playable_bounds();
        for (id, x, vx) in [(1, 100.0, 2.0), (2, 112.0, -2.0)] {
            let body = Body::new(Vec2::new(x, 100.0), Vec2::splat(COIN_SIZE), Vec2::new(vx, 0.0), bounds);
            state.coins.push(Coin::new(id, body, CoinTier::Bronze, 0, 240));
        }
        // Only the left coin (at 98.5 after separation) is in purse reach
        let click = TickInput {
            clicks: vec![Vec2::new(75.0, 100.0)],
            ..Default::default()
        };
        tick(&mut state, &click);
        assert_eq!(state.score, 2);
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.coins[0].id, 2);
        assert_eq!(state.coins[0].body.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_controls_apply_in_order() {
        let mut state = GameState::new(3);
        let input = TickInput {
            controls: vec![RoundControl::Start, RoundControl::TogglePause],
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, RoundPhase::Paused);

        let input = TickInput {
            controls: vec![RoundControl::TogglePause, RoundControl::TogglePause],
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, RoundPhase::Paused);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn test_merge_keeps_click_order() {
        let mut a = TickInput {
            pointer: Some(Vec2::ZERO),
            clicks: vec![Vec2::new(1.0, 1.0)],
            ..Default::default()
        };
        a.merge(TickInput {
            pointer: Some(Vec2::ONE),
            clicks: vec![Vec2::new(2.0, 2.0)],
            controls: vec![RoundControl::TogglePause],
            idle_mode: false,
        });
        assert_eq!(a.pointer, Some(Vec2::ONE));
        assert_eq!(a.clicks, vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
        assert_eq!(a.controls, vec![RoundControl::TogglePause]);
        assert!(!a.is_empty());
    }
}
