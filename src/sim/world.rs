/// WorldState: one running level.
///
/// Owns every entity collection of the level plus its frame counter,
/// score and barrel-jump detector. Platforms never change after load;
/// everything else is advanced by `step::step`.
///
/// ## Outcome latch
///
/// The first non-`Continue` result is stored in `outcome`. From then on
/// `update` hands back that same result and the world no longer moves.
///
/// ## Drawing
///
/// `draw` emits sprites to a `DrawSink` in a fixed back-to-front order:
/// platforms, ladders, hazards, power-ups, boss, player.

use crate::config::SimConfig;
use crate::domain::entity::{
    Barrel, DonkeyKong, Facing, FrameInput, Ladder, Monkey, Pickup, PickupKind, Platform, Player,
    Projectile, ProjectileKind, Weapon,
};
use crate::domain::geometry::Rect;
use crate::domain::jump::JumpDetector;
use crate::domain::physics::PhysicsParams;
use crate::domain::score::ScoreManager;

use super::step;

/// What one frame decided.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameResult {
    Continue,
    /// Boss beaten on a non-final level.
    AdvanceLevel,
    Win(u32),
    Lose(u32),
}

impl FrameResult {
    pub fn is_over(self) -> bool {
        self != FrameResult::Continue
    }
}

pub struct WorldState {
    pub config: SimConfig,

    // ── Meta ──
    pub level_index: usize,
    pub is_final_level: bool,
    pub name: String,

    // ── Entities ──
    pub player: Player,
    pub boss: DonkeyKong,
    pub platforms: Vec<Platform>,
    pub ladders: Vec<Ladder>,
    pub barrels: Vec<Barrel>,
    pub monkeys: Vec<Monkey>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,

    // ── Scoring ──
    pub jump_detector: JumpDetector,
    pub score: ScoreManager,

    /// Ladder gravity for this level (clamped at load).
    pub ladder_physics: PhysicsParams,
    pub frame: u32,
    pub outcome: Option<FrameResult>,
}

// ── Construction ──

impl WorldState {
    /// Empty level: player and boss at the origin, no scenery.
    /// The level loader fills it in.
    pub fn new(config: SimConfig, level_index: usize, is_final_level: bool, base_score: u32) -> Self {
        let player = Player::new(0.0, 0.0, config.sizes.player);
        let boss = DonkeyKong::new(0.0, 0.0, config.sizes.boss, 1);
        let jump_detector = JumpDetector::new(config.jump_rules());
        let score = ScoreManager::with_base(base_score, config.scoring.time_bonus_per_second);
        let ladder_physics = config.ladder_physics(None);

        WorldState {
            config,
            level_index,
            is_final_level,
            name: String::new(),
            player,
            boss,
            platforms: vec![],
            ladders: vec![],
            barrels: vec![],
            monkeys: vec![],
            projectiles: vec![],
            pickups: vec![],
            jump_detector,
            score,
            ladder_physics,
            frame: 0,
            outcome: None,
        }
    }
}

// ── Per-frame API ──

impl WorldState {
    /// Advance one frame and report what it decided.
    /// Headless drivers use this; the session wants the events too.
    #[allow(dead_code)]
    pub fn update(&mut self, input: &FrameInput) -> FrameResult {
        step::step(self, input).result
    }

    /// Current score including any time bonus already credited.
    pub fn score(&self) -> u32 {
        self.score.score()
    }

    /// Whole seconds left in the frame budget.
    pub fn remaining_seconds(&self) -> u32 {
        self.config.max_frames.saturating_sub(self.frame) / self.config.fps.max(1)
    }

    pub fn field(&self) -> Rect {
        self.config.field()
    }
}

// ══════════════════════════════════════════════════════════════
// Drawing
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Platform,
    Ladder,
    Barrel,
    Monkey { intelligent: bool, facing: Facing },
    Bullet,
    Banana,
    Hammer,
    Blaster,
    Boss { defeated: bool },
    Player { facing: Facing, climbing: bool, weapon: Weapon },
}

/// Receives sprites in draw order.
pub trait DrawSink {
    fn draw(&mut self, sprite: Sprite, bounds: Rect);
}

impl WorldState {
    pub fn draw<S: DrawSink + ?Sized>(&self, sink: &mut S) {
        for p in &self.platforms {
            sink.draw(Sprite::Platform, p.body.bounds());
        }
        for l in &self.ladders {
            sink.draw(Sprite::Ladder, l.body.bounds());
        }

        // Hazards
        for b in self.barrels.iter().filter(|b| !b.destroyed) {
            sink.draw(Sprite::Barrel, b.body.bounds());
        }
        for m in self.monkeys.iter().filter(|m| !m.destroyed) {
            let sprite = Sprite::Monkey { intelligent: m.is_intelligent(), facing: m.facing };
            sink.draw(sprite, m.body.bounds());
        }
        for p in self.projectiles.iter().filter(|p| p.active) {
            let sprite = match p.kind {
                ProjectileKind::Bullet => Sprite::Bullet,
                ProjectileKind::Banana => Sprite::Banana,
            };
            sink.draw(sprite, p.body.bounds());
        }

        // Power-ups
        for p in self.pickups.iter().filter(|p| !p.collected) {
            let sprite = match p.kind {
                PickupKind::Hammer => Sprite::Hammer,
                PickupKind::Blaster => Sprite::Blaster,
            };
            sink.draw(sprite, p.body.bounds());
        }

        sink.draw(Sprite::Boss { defeated: self.boss.is_defeated() }, self.boss.body.bounds());

        let p = &self.player;
        let sprite = Sprite::Player { facing: p.facing, climbing: p.is_climbing(), weapon: p.weapon };
        sink.draw(sprite, p.body.bounds());
    }
}
