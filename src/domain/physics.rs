/// Gravity integration and the capability traits it works through.
///
/// ## Contract (per mover, per frame)
///
/// ┌───────────────────────────────┬─────────────────────────────────────┐
/// │ Condition                     │ Effect                              │
/// ├───────────────────────────────┼─────────────────────────────────────┤
/// │ always                        │ prev_y = y                          │
/// │ suspended (climbing / pinned) │ no vertical change                  │
/// │ grounded                      │ vy = 0                              │
/// │ airborne                      │ vy = min(vy + g, terminal); y += vy │
/// │ always                        │ x += vx                             │
/// └───────────────────────────────┴─────────────────────────────────────┘
///
/// Projectiles never pass through here: they have no gravity.
/// Each type owns its velocity; only the owner's methods and this
/// integrator write to it.

use super::entity::{
    Barrel, Body, DonkeyKong, Ladder, Monkey, Motion, Pickup, Platform, Player, Projectile,
};
use super::geometry::Rect;

/// Gravity / terminal velocity pair for one entity type.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhysicsParams {
    pub gravity: f64,
    pub terminal_velocity: f64,
}

impl PhysicsParams {
    pub const fn new(gravity: f64, terminal_velocity: f64) -> Self {
        PhysicsParams { gravity, terminal_velocity }
    }
}

// ══════════════════════════════════════════════════════════════
// Capabilities
// ══════════════════════════════════════════════════════════════

/// Anything with a bounding box.
pub trait Collidable {
    fn body(&self) -> &Body;

    fn bounds(&self) -> Rect {
        self.body().bounds()
    }
}

/// Anything that integrates velocity into position.
pub trait Mover: Collidable {
    fn body_mut(&mut self) -> &mut Body;
    fn motion(&self) -> &Motion;
    fn motion_mut(&mut self) -> &mut Motion;

    /// Suspended movers ignore gravity (climbing player, pinned ladder).
    fn suspended(&self) -> bool {
        false
    }
}

macro_rules! collidable {
    ($($ty:ty),* $(,)?) => {
        $(impl Collidable for $ty {
            fn body(&self) -> &Body { &self.body }
        })*
    };
}

macro_rules! mover {
    ($($ty:ty),* $(,)?) => {
        $(impl Mover for $ty {
            fn body_mut(&mut self) -> &mut Body { &mut self.body }
            fn motion(&self) -> &Motion { &self.motion }
            fn motion_mut(&mut self) -> &mut Motion { &mut self.motion }
            fn suspended(&self) -> bool { <$ty>::suspended_flag(self) }
        })*
    };
}

collidable!(Player, Barrel, Ladder, Platform, DonkeyKong, Monkey, Projectile, Pickup);
mover!(Player, Barrel, Ladder, DonkeyKong, Monkey);

impl Player {
    fn suspended_flag(&self) -> bool { self.is_climbing() }
}

impl Ladder {
    fn suspended_flag(&self) -> bool { self.pinned }
}

impl Barrel {
    fn suspended_flag(&self) -> bool { false }
}

impl DonkeyKong {
    fn suspended_flag(&self) -> bool { false }
}

impl Monkey {
    fn suspended_flag(&self) -> bool { false }
}

// ══════════════════════════════════════════════════════════════
// Integration
// ══════════════════════════════════════════════════════════════

/// Advance one mover by one frame.
pub fn integrate<M: Mover + ?Sized>(mover: &mut M, params: PhysicsParams) {
    let y = mover.body().y;
    let suspended = mover.suspended();
    let motion = mover.motion_mut();
    motion.prev_y = y;

    let mut dy = 0.0;
    if !suspended {
        if motion.grounded {
            motion.vy = 0.0;
        } else {
            motion.vy = (motion.vy + params.gravity).min(params.terminal_velocity);
            dy = motion.vy;
        }
    }
    let dx = motion.vx;

    let body = mover.body_mut();
    body.y += dy;
    body.x += dx;
}

/// Previous-frame bottom edge of a mover.
pub fn prev_bottom<M: Mover + ?Sized>(mover: &M) -> f64 {
    mover.motion().prev_y + mover.body().half_height()
}
