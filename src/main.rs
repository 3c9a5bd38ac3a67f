//! Gold Rush headless entry point
//!
//! Plays rounds with the autopilot through the real tick driver and appends
//! final scores to the JSON score ledger.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use gold_rush::render::{Frame, Renderer};
use gold_rush::sim::{GameEvent, RoundControl, RoundPhase};
use gold_rush::{Game, JsonFileLedger, MemoryLedger, ScoreLedger, Settings, TickDriver};

#[derive(Debug, Parser)]
#[command(name = "gold-rush", about = "Headless Gold Rush rounds driven by the autopilot")]
struct Args {
    /// Player the scores are recorded under
    #[arg(long, default_value = "Player")]
    player: String,
    /// RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of rounds to play
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Rules file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Score ledger file (JSON)
    #[arg(long, default_value = "scores.json")]
    scores: PathBuf,
    /// Pace ticks at wall-clock speed instead of as fast as possible
    #[arg(long)]
    realtime: bool,
}

/// Logs the HUD once per countdown second
#[derive(Default)]
struct LogRenderer {
    last_second: Option<u32>,
}

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &Frame) {
        let hud = &frame.hud;
        if hud.phase != RoundPhase::Running || self.last_second == Some(hud.remaining_seconds) {
            return;
        }
        self.last_second = Some(hud.remaining_seconds);
        log::debug!(
            "t={}s score={} lives={} entities={} powerup={:?}",
            hud.remaining_seconds,
            hud.score,
            hud.lives,
            frame.entities.len(),
            hud.powerup_seconds_left
        );
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Gold Rush (headless) starting...");

    let settings = args
        .settings
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    let ledger: Box<dyn ScoreLedger> = match JsonFileLedger::open(&args.scores) {
        Ok(ledger) => Box::new(ledger),
        Err(e) => {
            log::warn!("Score ledger unavailable ({}), scores will not be kept", e);
            Box::new(MemoryLedger::new())
        }
    };

    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    let mut game = Game::new(settings.clone(), seed, args.player.as_str(), ledger);
    let mut driver = TickDriver::new(&settings);
    driver.idle_mode = true;
    driver.start();
    let input = driver.input();
    let mut renderer = LogRenderer::default();
    let frame_time = Duration::from_secs_f32(settings.tick_secs);

    for round in 1..=args.rounds {
        input.control(RoundControl::Start);
        loop {
            let (_, events) = driver.advance(&mut game, settings.tick_secs);
            for event in &events {
                match event {
                    GameEvent::BombDetonated { lives_left, .. } => {
                        log::info!("Bomb! {} lives left", lives_left)
                    }
                    GameEvent::PowerUpActivated { .. } => log::info!("Autocollect on"),
                    GameEvent::RoundEnded { score, reason } => {
                        println!("Round {}: {} points ({:?})", round, score, reason)
                    }
                    _ => {}
                }
            }
            game.draw(&mut renderer);
            if game.phase() == RoundPhase::Ended {
                break;
            }
            if args.realtime {
                std::thread::sleep(frame_time);
            }
        }
    }
    driver.stop();

    match JsonFileLedger::open(&args.scores) {
        Ok(ledger) => println!("\n{}", ledger.history().format_history(game.player_id())),
        Err(e) => log::warn!("Could not reload score history: {}", e),
    }
}
