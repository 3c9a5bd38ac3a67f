//! Fixed-timestep tick driver
//!
//! Hosts feed wall-clock time in and input events whenever they arrive. The
//! driver turns elapsed time into whole ticks and hands buffered input to the
//! first tick only, so input always lands on a tick boundary.

use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec2;

use crate::game::Game;
use crate::settings::Settings;
use crate::sim::{GameEvent, RoundControl, TickInput};

/// Thread-safe input buffer shared between input sources and the driver
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    inner: Arc<Mutex<TickInput>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TickInput> {
        // A panicked writer leaves plain data behind; keep using it
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn pointer_moved(&self, pos: Vec2) {
        self.lock().pointer = Some(pos);
    }

    pub fn click(&self, pos: Vec2) {
        let mut input = self.lock();
        input.pointer = Some(pos);
        input.clicks.push(pos);
    }

    pub fn control(&self, control: RoundControl) {
        self.lock().controls.push(control);
    }

    /// Take everything buffered so far
    pub fn take(&self) -> TickInput {
        std::mem::take(&mut *self.lock())
    }
}

/// Drives `Game::step` at a fixed rate
#[derive(Debug)]
pub struct TickDriver {
    tick_secs: f32,
    max_substeps: u32,
    accumulator: f32,
    running: bool,
    /// Autopilot plays every tick
    pub idle_mode: bool,
    queue: InputQueue,
}

impl TickDriver {
    pub fn new(settings: &Settings) -> Self {
        let settings = settings.clone().sanitized();
        Self {
            tick_secs: settings.tick_secs,
            max_substeps: settings.max_substeps,
            accumulator: 0.0,
            running: false,
            idle_mode: false,
            queue: InputQueue::new(),
        }
    }

    /// Handle for input sources
    pub fn input(&self) -> InputQueue {
        self.queue.clone()
    }

    /// Start ticking. Starting again replaces the current run.
    pub fn start(&mut self) {
        if self.running {
            log::debug!("Tick driver restarted");
        }
        self.running = true;
        self.accumulator = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `elapsed_secs` of wall-clock time. Returns the number of
    /// ticks run and the events they produced.
    pub fn advance(&mut self, game: &mut Game, elapsed_secs: f32) -> (u32, Vec<GameEvent>) {
        let mut events = Vec::new();
        if !self.running {
            return (0, events);
        }

        let dt = elapsed_secs.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= self.tick_secs && substeps < self.max_substeps {
            let mut input = if substeps == 0 {
                self.queue.take()
            } else {
                TickInput::default()
            };
            input.idle_mode = self.idle_mode;
            events.extend(game.step(&input));
            self.accumulator -= self.tick_secs;
            substeps += 1;
        }

        (substeps, events)
    }
}
