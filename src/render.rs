//! Renderer boundary
//!
//! The simulation never paints. Once per frame the host receives a `Frame`:
//! every visible entity plus HUD values. GPU hosts can upload
//! `Frame::instances()` as-is.

use std::collections::HashMap;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::Rgb;
use crate::sim::{CoinTier, EntityKind, GameState, RoundPhase};

/// Images a host may supply (coins are always drawn as shapes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Bomb,
    PowerUp,
    Purse,
    Background,
}

impl Sprite {
    pub const ALL: [Sprite; 4] = [Sprite::Bomb, Sprite::PowerUp, Sprite::Purse, Sprite::Background];

    /// Shape color used when the image is missing
    pub fn fallback_color(&self) -> Rgb {
        match self {
            Sprite::Bomb => crate::sim::Bomb::color(),
            Sprite::PowerUp => crate::sim::PowerUp::color(),
            Sprite::Purse => crate::sim::Purse::base_color(),
            Sprite::Background => [245, 245, 250],
        }
    }
}

/// Host-owned images keyed by sprite. A missing entry means "draw the
/// fallback shape".
#[derive(Debug, Clone)]
pub struct AssetRegistry<I> {
    images: HashMap<Sprite, I>,
}

impl<I> Default for AssetRegistry<I> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
        }
    }
}

impl<I> AssetRegistry<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sprite: Sprite, image: I) {
        self.images.insert(sprite, image);
    }

    pub fn get(&self, sprite: Sprite) -> Option<&I> {
        self.images.get(&sprite)
    }

    /// Load `<dir>/<name>.png` for every sprite with `loader`. Failures are
    /// logged and leave the sprite empty.
    pub fn load_dir<E: std::fmt::Display>(
        dir: impl AsRef<Path>,
        mut loader: impl FnMut(&Path) -> Result<I, E>,
    ) -> Self {
        let dir = dir.as_ref();
        let mut registry = Self::new();
        for sprite in Sprite::ALL {
            let path = dir.join(format!("{}.png", sprite_file_stem(sprite)));
            match loader(&path) {
                Ok(image) => registry.insert(sprite, image),
                Err(e) => log::warn!("Failed to load {}: {}", path.display(), e),
            }
        }
        registry
    }
}

fn sprite_file_stem(sprite: Sprite) -> &'static str {
    match sprite {
        Sprite::Bomb => "bomb",
        Sprite::PowerUp => "powerup",
        Sprite::Purse => "purse",
        Sprite::Background => "game_bg",
    }
}

/// Per-kind visual state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    Coin { tier: CoinTier },
    Bomb { detonated: bool, explosion_frame: u32 },
    PowerUp,
    Purse,
}

/// One drawable entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub center: Vec2,
    pub size: Vec2,
    pub color: Rgb,
    pub visual: Visual,
}

/// Explosion animation rings for a detonated bomb
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionRings {
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub alpha: u8,
}

pub fn explosion_rings(frame: u32) -> ExplosionRings {
    let outer_radius = 10.0 + frame as f32 * 5.0;
    ExplosionRings {
        outer_radius,
        inner_radius: outer_radius * 0.6,
        alpha: 255u32.saturating_sub(frame * 20) as u8,
    }
}

/// HUD values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub phase: RoundPhase,
    pub score: u64,
    pub lives: u8,
    pub remaining_seconds: u32,
    pub paused: bool,
    /// Autocollect seconds left (None when inactive)
    pub powerup_seconds_left: Option<u64>,
    /// Countdown is in its last ten seconds
    pub low_time: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub entities: Vec<EntityView>,
    pub hud: Hud,
}

impl Frame {
    /// Snapshot the visible board
    pub fn capture(state: &GameState) -> Self {
        let now = state.tick;
        let mut entities = Vec::with_capacity(
            state.coins.len() + state.bombs.len() + state.powerups.len() + 1,
        );

        for coin in state.coins.iter().filter(|c| c.is_live(now)) {
            entities.push(EntityView {
                id: coin.id,
                kind: EntityKind::Coin,
                center: coin.body.pos,
                size: coin.body.extent,
                color: coin.tier.color(),
                visual: Visual::Coin { tier: coin.tier },
            });
        }
        for bomb in state
            .bombs
            .iter()
            .filter(|b| !b.is_expired(now) && !b.is_detonation_complete())
        {
            entities.push(EntityView {
                id: bomb.id,
                kind: EntityKind::Bomb,
                center: bomb.body.pos,
                size: bomb.body.extent,
                color: crate::sim::Bomb::color(),
                visual: Visual::Bomb {
                    detonated: bomb.detonated,
                    explosion_frame: bomb.explosion_frame,
                },
            });
        }
        for powerup in state.powerups.iter().filter(|p| !p.is_expired(now)) {
            entities.push(EntityView {
                id: powerup.id,
                kind: EntityKind::PowerUp,
                center: powerup.body.pos,
                size: powerup.body.extent,
                color: crate::sim::PowerUp::color(),
                visual: Visual::PowerUp,
            });
        }
        entities.push(EntityView {
            id: 0,
            kind: EntityKind::Purse,
            center: state.purse.body.pos,
            size: state.purse.body.extent,
            color: state.purse.highlight(now),
            visual: Visual::Purse,
        });

        Self {
            tick: now,
            entities,
            hud: Hud {
                phase: state.phase,
                score: state.score,
                lives: state.lives,
                remaining_seconds: state.remaining_seconds,
                paused: state.is_paused(),
                powerup_seconds_left: state
                    .powerup_active
                    .then(|| state.powerup_seconds_left()),
                low_time: state.remaining_seconds <= 10,
            },
        }
    }

    /// GPU instance records, one per entity
    pub fn instances(&self) -> Vec<Instance> {
        self.entities.iter().map(Instance::from_view).collect()
    }
}

/// Instanced quad: center, size, RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

impl Instance {
    pub fn from_view(view: &EntityView) -> Self {
        let rgb = |c: Rgb, a: u8| {
            [
                c[0] as f32 / 255.0,
                c[1] as f32 / 255.0,
                c[2] as f32 / 255.0,
                a as f32 / 255.0,
            ]
        };
        match view.visual {
            Visual::Bomb {
                detonated: true,
                explosion_frame,
            } => {
                let rings = explosion_rings(explosion_frame);
                Self {
                    center: view.center.to_array(),
                    size: [rings.outer_radius * 2.0; 2],
                    color: rgb([255, 165, 0], rings.alpha),
                }
            }
            _ => Self {
                center: view.center.to_array(),
                size: view.size.to_array(),
                color: rgb(view.color, 255),
            },
        }
    }
}

/// A surface that can paint frames
pub trait Renderer {
    fn draw(&mut self, frame: &Frame);
}
