/// Entities: Player, Barrel, Ladder, Platform, DonkeyKong, Monkey,
/// Projectile, Pickup. Plus the per-frame input they react to.
///
/// Every entity owns a `Body` (center + size). Anything that falls also
/// owns a `Motion`. Variants that differ only in behavior (monkey kinds,
/// projectile kinds, weapons) are tagged enums rather than separate types.

use super::geometry::{Rect, Size};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

// ── Body / Motion ──

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub size: Size,
}

impl Body {
    pub fn new(x: f64, y: f64, size: Size) -> Self {
        Body { x, y, size }
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.size)
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.size.width / 2.0
    }

    #[inline]
    pub fn half_height(&self) -> f64 {
        self.size.height / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.half_height()
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.half_height()
    }

    pub fn left(&self) -> f64 {
        self.x - self.half_width()
    }

    pub fn right(&self) -> f64 {
        self.x + self.half_width()
    }
}

/// Velocity and grounding for anything that moves.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Motion {
    pub vx: f64,
    pub vy: f64,
    pub grounded: bool,
    /// Center Y before this frame's integration (penetration checks).
    pub prev_y: f64,
}

impl Motion {
    pub fn new(y: f64, vy: f64) -> Self {
        Motion { vx: 0.0, vy, grounded: false, prev_y: y }
    }
}

// ── Player ──

/// Index into the level's ladder list. Never an owning reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LadderId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClimbState {
    Free,
    Climbing { ladder: LadderId },
}

/// Held weapon. The variants are mutually exclusive by construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Weapon {
    None,
    Hammer,
    Blaster { bullets: u32 },
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub motion: Motion,
    pub facing: Facing,
    pub climb: ClimbState,
    pub weapon: Weapon,
}

impl Player {
    pub fn new(x: f64, y: f64, size: Size) -> Self {
        Player {
            body: Body::new(x, y, size),
            motion: Motion::new(y, 0.0),
            facing: Facing::Right,
            climb: ClimbState::Free,
            weapon: Weapon::None,
        }
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self.climb, ClimbState::Climbing { .. })
    }

    pub fn has_hammer(&self) -> bool {
        self.weapon == Weapon::Hammer
    }

    pub fn bullets(&self) -> u32 {
        match self.weapon {
            Weapon::Blaster { bullets } => bullets,
            _ => 0,
        }
    }

    /// Picking up a hammer drops any blaster and its ammo.
    pub fn collect_hammer(&mut self) {
        self.weapon = Weapon::Hammer;
    }

    /// Picking up a blaster drops the hammer; a second blaster adds ammo.
    pub fn collect_blaster(&mut self, bullets: u32) {
        self.weapon = match self.weapon {
            Weapon::Blaster { bullets: held } => Weapon::Blaster { bullets: held + bullets },
            _ => Weapon::Blaster { bullets },
        };
    }

    /// Spend one bullet. The last bullet drops the blaster.
    /// Returns false (and changes nothing) when there is nothing to fire.
    pub fn take_bullet(&mut self) -> bool {
        match self.weapon {
            Weapon::Blaster { bullets } if bullets > 1 => {
                self.weapon = Weapon::Blaster { bullets: bullets - 1 };
                true
            }
            Weapon::Blaster { bullets: 1 } => {
                self.weapon = Weapon::None;
                true
            }
            _ => false,
        }
    }
}

// ── Static and falling scenery ──

#[derive(Clone, Debug)]
pub struct Platform {
    pub body: Body,
}

impl Platform {
    pub fn new(x: f64, y: f64, size: Size) -> Self {
        Platform { body: Body::new(x, y, size) }
    }

    pub fn top(&self) -> f64 {
        self.body.top()
    }
}

/// Falls like a barrel until it first lands, then stays pinned.
#[derive(Clone, Debug)]
pub struct Ladder {
    pub body: Body,
    pub motion: Motion,
    pub pinned: bool,
}

impl Ladder {
    pub fn new(x: f64, y: f64, size: Size) -> Self {
        Ladder { body: Body::new(x, y, size), motion: Motion::new(y, 0.0), pinned: false }
    }
}

#[derive(Clone, Debug)]
pub struct Barrel {
    /// Stable across purges; keys the jump detector's trackers.
    pub id: u32,
    pub body: Body,
    pub motion: Motion,
    pub destroyed: bool,
}

impl Barrel {
    pub fn new(id: u32, x: f64, y: f64, size: Size, initial_vy: f64) -> Self {
        Barrel { id, body: Body::new(x, y, size), motion: Motion::new(y, initial_vy), destroyed: false }
    }
}

// ── Boss ──

#[derive(Clone, Debug)]
pub struct DonkeyKong {
    pub body: Body,
    pub motion: Motion,
    pub health: u32,
    pub max_health: u32,
}

impl DonkeyKong {
    pub fn new(x: f64, y: f64, size: Size, max_health: u32) -> Self {
        DonkeyKong {
            body: Body::new(x, y, size),
            motion: Motion::new(y, 0.0),
            health: max_health,
            max_health,
        }
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// A hammer blow ends the fight regardless of remaining health.
    pub fn defeat(&mut self) {
        self.health = 0;
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }
}

// ── Monkeys ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonkeyKind {
    Normal,
    /// Throws a banana whenever the cooldown (in frames) runs out.
    Intelligent { banana_cooldown: u32 },
}

#[derive(Clone, Debug)]
pub struct Monkey {
    pub kind: MonkeyKind,
    pub body: Body,
    pub motion: Motion,
    pub facing: Facing,
    /// Distances walked before each turn-around, cycled in order.
    pub patrol: Vec<f64>,
    pub patrol_index: usize,
    pub travelled: f64,
    pub destroyed: bool,
}

impl Monkey {
    pub fn new(kind: MonkeyKind, x: f64, y: f64, size: Size, facing: Facing, patrol: Vec<f64>) -> Self {
        Monkey {
            kind,
            body: Body::new(x, y, size),
            motion: Motion::new(y, 0.0),
            facing,
            patrol,
            patrol_index: 0,
            travelled: 0.0,
            destroyed: false,
        }
    }

    pub fn is_intelligent(&self) -> bool {
        matches!(self.kind, MonkeyKind::Intelligent { .. })
    }
}

// ── Projectiles / Pickups ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ProjectileKind {
    Bullet,
    Banana,
}

/// Straight-line shot: fixed horizontal speed, no gravity.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub body: Body,
    pub vx: f64,
    pub travelled: f64,
    pub active: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, x: f64, y: f64, size: Size, facing: Facing, speed: f64) -> Self {
        Projectile {
            kind,
            body: Body::new(x, y, size),
            vx: facing.sign() * speed.abs(),
            travelled: 0.0,
            active: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickupKind {
    Hammer,
    Blaster,
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub body: Body,
    pub collected: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, x: f64, y: f64, size: Size) -> Self {
        Pickup { kind, body: Body::new(x, y, size), collected: false }
    }
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

/// Logical keys the game reacts to, independent of device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Fire,
    Confirm,
    Cancel,
}

/// Anything that can answer "is this key held" and "was it just pressed".
pub trait InputSource {
    fn is_down(&self, key: Key) -> bool;
    fn was_pressed(&self, key: Key) -> bool;
}

/// One frame of gameplay input.
/// Movement is level-triggered (held), jump and fire are edge-triggered.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub fire: bool,
}

impl FrameInput {
    pub fn from_source<S: InputSource + ?Sized>(src: &S) -> Self {
        FrameInput {
            left: src.is_down(Key::Left),
            right: src.is_down(Key::Right),
            up: src.is_down(Key::Up),
            down: src.is_down(Key::Down),
            jump: src.was_pressed(Key::Jump),
            fire: src.was_pressed(Key::Fire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: Size = Size::new(30.0, 40.0);

    #[test]
    fn weapons_are_mutually_exclusive() {
        let mut p = Player::new(0.0, 0.0, PLAYER);
        p.collect_blaster(5);
        assert_eq!(p.bullets(), 5);
        assert!(!p.has_hammer());

        p.collect_hammer();
        assert!(p.has_hammer());
        assert_eq!(p.bullets(), 0);

        p.collect_blaster(5);
        assert!(!p.has_hammer());
        assert_eq!(p.weapon, Weapon::Blaster { bullets: 5 });
    }

    #[test]
    fn second_blaster_adds_ammo() {
        let mut p = Player::new(0.0, 0.0, PLAYER);
        p.collect_blaster(5);
        p.collect_blaster(5);
        assert_eq!(p.bullets(), 10);
    }

    #[test]
    fn last_bullet_drops_blaster() {
        let mut p = Player::new(0.0, 0.0, PLAYER);
        p.collect_blaster(2);
        assert!(p.take_bullet());
        assert_eq!(p.bullets(), 1);
        assert!(p.take_bullet());
        assert_eq!(p.weapon, Weapon::None);
        assert!(!p.take_bullet());
    }

    #[test]
    fn hammer_cannot_fire() {
        let mut p = Player::new(0.0, 0.0, PLAYER);
        p.collect_hammer();
        assert!(!p.take_bullet());
        assert!(p.has_hammer());
    }

    #[test]
    fn boss_damage_saturates() {
        let mut dk = DonkeyKong::new(0.0, 0.0, Size::new(80.0, 64.0), 5);
        dk.take_damage(2);
        assert_eq!(dk.health, 3);
        dk.take_damage(10);
        assert!(dk.is_defeated());

        let mut dk = DonkeyKong::new(0.0, 0.0, Size::new(80.0, 64.0), 5);
        dk.defeat();
        assert!(dk.is_defeated());
    }

    #[test]
    fn projectile_velocity_follows_facing() {
        let p = Projectile::new(ProjectileKind::Banana, 0.0, 0.0, Size::new(14.0, 10.0), Facing::Left, 1.8);
        assert_eq!(p.vx, -1.8);
        let p = Projectile::new(ProjectileKind::Bullet, 0.0, 0.0, Size::new(12.0, 4.0), Facing::Right, 3.8);
        assert_eq!(p.vx, 3.8);
    }

    struct Held(Vec<Key>, Vec<Key>);

    impl InputSource for Held {
        fn is_down(&self, key: Key) -> bool { self.0.contains(&key) }
        fn was_pressed(&self, key: Key) -> bool { self.1.contains(&key) }
    }

    #[test]
    fn frame_input_separates_held_and_pressed() {
        // Jump held but not freshly pressed does not jump again.
        let src = Held(vec![Key::Left, Key::Jump], vec![Key::Fire]);
        let input = FrameInput::from_source(&src);
        assert!(input.left);
        assert!(!input.right);
        assert!(!input.jump);
        assert!(input.fire);
    }
}
