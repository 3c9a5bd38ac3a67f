//! Round host
//!
//! Wraps the simulation with the pieces that touch the outside world: the
//! score ledger, the player identity and the draw step.

use crate::ledger::ScoreLedger;
use crate::render::{Frame, Renderer};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, RoundControl, RoundPhase, TickInput, tick};

/// A game session for one player
pub struct Game {
    pub state: GameState,
    player_id: String,
    ledger: Box<dyn ScoreLedger>,
    /// Rounds whose final score reached the ledger call
    rounds_recorded: u32,
}

impl Game {
    pub fn new(
        settings: Settings,
        seed: u64,
        player_id: impl Into<String>,
        ledger: Box<dyn ScoreLedger>,
    ) -> Self {
        Self {
            state: GameState::with_settings(settings, seed),
            player_id: player_id.into(),
            ledger,
            rounds_recorded: 0,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn set_player_id(&mut self, player_id: impl Into<String>) {
        self.player_id = player_id.into();
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn rounds_recorded(&self) -> u32 {
        self.rounds_recorded
    }

    pub fn start(&mut self) -> bool {
        self.state.start()
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.toggle_pause()
    }

    pub fn reset(&mut self) -> bool {
        self.state.reset()
    }

    pub fn control(&mut self, control: RoundControl) -> bool {
        self.state.apply_control(control)
    }

    /// Run one tick and return the events it produced. Records the final
    /// score when this tick ended the round.
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        tick(&mut self.state, input);
        let events = self.state.drain_events();

        for event in &events {
            if let GameEvent::RoundEnded { score, .. } = event {
                self.record_score(*score);
            }
        }
        events
    }

    /// Persistence failures are logged and never block the round from ending
    fn record_score(&mut self, score: u64) {
        self.rounds_recorded += 1;
        if let Err(e) = self.ledger.record_final_score(&self.player_id, score) {
            log::warn!("Failed to record score {} for {}: {}", score, self.player_id, e);
        }
    }

    /// Hand the current frame to the renderer, then advance explosion
    /// animations by one frame.
    pub fn draw(&mut self, renderer: &mut impl Renderer) {
        let frame = Frame::capture(&self.state);
        renderer.draw(&frame);
        for bomb in self.state.bombs.iter_mut() {
            bomb.advance_explosion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::sim::spawn::spawn_bomb;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Ledger that logs calls into a shared list
    #[derive(Clone, Default)]
    struct RecordingLedger {
        calls: Rc<RefCell<Vec<(String, u64)>>>,
        fail: bool,
    }

    impl ScoreLedger for RecordingLedger {
        fn record_final_score(&mut self, player_id: &str, score: u64) -> Result<(), LedgerError> {
            self.calls.borrow_mut().push((player_id.to_string(), score));
            if self.fail {
                Err(LedgerError::InvalidPlayer(player_id.to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: Vec<Frame>,
    }

    impl Renderer for CountingRenderer {
        fn draw(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }
    }

    fn quiet() -> Settings {
        Settings {
            bomb_chance: 0.0,
            powerup_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_round_records_once() {
        let ledger = RecordingLedger::default();
        let calls = ledger.calls.clone();
        let mut game = Game::new(quiet(), 77, "ana", Box::new(ledger));
        game.start();

        let input = TickInput::default();
        for _ in 0..3600 {
            game.step(&input);
        }
        assert_eq!(game.phase(), RoundPhase::Ended);
        assert_eq!(*calls.borrow(), vec![("ana".to_string(), 0)]);

        for _ in 0..100 {
            game.step(&input);
        }
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(game.rounds_recorded(), 1);
    }

    #[test]
    fn test_accumulated_score_is_recorded() {
        let ledger = RecordingLedger::default();
        let calls = ledger.calls.clone();
        let mut game = Game::new(quiet(), 77, "ana", Box::new(ledger));
        game.start();
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut last_score = 0;
        for _ in 0..3600 {
            game.step(&idle);
            if game.phase() == RoundPhase::Running {
                last_score = game.state.score;
            }
        }
        assert_eq!(game.phase(), RoundPhase::Ended);
        assert_eq!(calls.borrow()[0].1, game.state.score);
        assert_eq!(game.state.score, last_score);
    }

    #[test]
    fn test_ledger_failure_does_not_block_end() {
        let ledger = RecordingLedger {
            fail: true,
            ..Default::default()
        };
        let calls = ledger.calls.clone();
        let mut game = Game::new(quiet(), 1, "ana", Box::new(ledger));
        game.start();
        game.state.lives = 1;
        let pos = Vec2::new(300.0, 300.0);
        spawn_bomb(&mut game.state, pos);
        game.state.bombs[0].body.vel = Vec2::ZERO;

        let events = game.step(&TickInput {
            clicks: vec![pos],
            ..Default::default()
        });
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundEnded { .. })));
        assert_eq!(game.phase(), RoundPhase::Ended);
        assert_eq!(calls.borrow().len(), 1);

        // A new round can start right away
        assert!(game.start());
        assert_eq!(game.state.lives, 3);
    }

    #[test]
    fn test_draw_advances_explosion() {
        let mut game = Game::new(quiet(), 1, "ana", Box::new(RecordingLedger::default()));
        game.start();
        let pos = Vec2::new(300.0, 300.0);
        spawn_bomb(&mut game.state, pos);
        game.state.bombs[0].detonate();

        let mut renderer = CountingRenderer::default();
        for _ in 0..10 {
            game.draw(&mut renderer);
        }
        assert_eq!(renderer.frames.len(), 10);
        assert!(game.state.bombs[0].is_detonation_complete());

        game.step(&TickInput::default());
        assert!(game.state.bombs.is_empty());

        game.draw(&mut renderer);
        let last = renderer.frames.last().unwrap();
        assert_eq!(last.entities.len(), 1);
    }

    #[test]
    fn test_controls_pass_through() {
        let mut game = Game::new(quiet(), 1, "ana", Box::new(RecordingLedger::default()));
        assert!(!game.toggle_pause());
        assert!(game.control(RoundControl::Start));
        assert!(game.toggle_pause());
        assert_eq!(game.phase(), RoundPhase::Paused);
        assert!(game.reset());
        assert_eq!(game.phase(), RoundPhase::Idle);
    }
}
