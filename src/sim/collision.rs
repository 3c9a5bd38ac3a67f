//! Collision detection and response
//!
//! Coin-coin contacts bounce elastically (equal mass). The purse only
//! interacts on clicks, except while autocollect is on.

use glam::Vec2;

use super::entity::{Body, Coin, Entity, FeedbackKind};
use super::state::{GameEvent, GameState, RoundEndReason, RoundPhase};

/// Resolve an approaching equal-mass pair along the contact normal.
///
/// Returns false (and leaves both bodies untouched) when the centers
/// coincide or the pair is already separating.
pub fn resolve_elastic(a: &mut Body, b: &mut Body) -> bool {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    if distance <= 0.0 {
        return false;
    }

    let normal = delta / distance;
    let dvn = (b.vel - a.vel).dot(normal);
    if dvn >= 0.0 {
        return false;
    }

    // Exchange the normal components
    a.vel += dvn * normal;
    b.vel -= dvn * normal;

    // Push apart by the overlap, half each
    let overlap = ((a.radius() + b.radius()) - distance).max(0.0);
    let separation = normal * (overlap / 2.0);
    a.pos -= separation;
    b.pos += separation;
    true
}

/// Bounce every overlapping pair of live coins. Returns the number of
/// pairs resolved.
pub fn resolve_coin_collisions(coins: &mut [Coin], now: u64) -> usize {
    let mut resolved = 0;
    for i in 0..coins.len() {
        let (head, tail) = coins.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.is_live(now) {
            continue;
        }
        for b in tail.iter_mut() {
            if !b.is_live(now) {
                continue;
            }
            if a.collides_with(&b.body) && resolve_elastic(&mut a.body, &mut b.body) {
                resolved += 1;
            }
        }
    }
    resolved
}

/// Handle one click at `point`.
///
/// The purse jumps to the click first. A click that lands on a powerup
/// activates exactly that one and is consumed. Otherwise every coin in purse
/// reach is collected, then (unless autocollect is on) every bomb in reach
/// detonates.
pub fn resolve_click(state: &mut GameState, point: Vec2) {
    if state.phase != RoundPhase::Running {
        return;
    }
    state.purse.follow_pointer(point);
    let now = state.tick;

    if let Some(idx) = state
        .powerups
        .iter()
        .position(|pu| !pu.is_expired(now) && pu.contains_point(point))
    {
        let mut powerup = state.powerups.remove(idx);
        powerup.activate(now);
        state.start_autocollect();
        return;
    }

    let mut collected = false;
    for coin in state.coins.iter_mut() {
        if coin.is_live(now) && state.purse.reaches(&coin.body) {
            coin.collect();
            state.score += coin.points();
            state.events.push(GameEvent::CoinCollected {
                tier: coin.tier,
                points: coin.points(),
            });
            collected = true;
        }
    }
    if collected {
        let duration = state.settings.collect_feedback_ticks;
        state.purse.flash(FeedbackKind::Collected, now, duration);
    }

    if state.powerup_active {
        return;
    }

    let mut out_of_lives = false;
    let mut detonated = false;
    for bomb in state.bombs.iter_mut() {
        if bomb.is_live(now) && state.purse.reaches(&bomb.body) {
            bomb.detonate();
            state.score = state.score.saturating_sub(bomb.penalty);
            state.lives = state.lives.saturating_sub(1);
            state.events.push(GameEvent::BombDetonated {
                penalty: bomb.penalty,
                lives_left: state.lives,
            });
            log::debug!("Bomb {} detonated, {} lives left", bomb.id, state.lives);
            detonated = true;
            if state.lives == 0 {
                out_of_lives = true;
                break;
            }
        }
    }
    if detonated {
        let duration = state.settings.detonate_feedback_ticks;
        state.purse.flash(FeedbackKind::Detonated, now, duration);
    }
    if out_of_lives {
        state.end_round(RoundEndReason::LivesExhausted);
    }
}

/// Autocollect pass: collect coins under the purse, then expire the effect
pub fn autocollect(state: &mut GameState) {
    if !state.powerup_active {
        return;
    }
    let now = state.tick;

    for coin in state.coins.iter_mut() {
        if coin.is_live(now) && state.purse.reaches(&coin.body) {
            coin.collect();
            state.score += coin.points();
            state.events.push(GameEvent::CoinCollected {
                tier: coin.tier,
                points: coin.points(),
            });
        }
    }

    if now >= state.powerup_end_tick {
        state.powerup_active = false;
        state.events.push(GameEvent::PowerUpExpired);
        log::debug!("Autocollect off at tick {}", now);
    }
}
