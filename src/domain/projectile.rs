/// Projectile lifecycle and hit resolution.
///
/// Bullets and bananas fly straight at a fixed speed. A projectile goes
/// inactive once it has covered its range, left the play field, or run
/// into a platform. What happens when it touches something is a pure
/// lookup on (kind, target).

use super::collision::hits_platform;
use super::entity::{Platform, Projectile, ProjectileKind};
use super::geometry::Rect;

/// Things a projectile can touch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    Player,
    Monkey,
    Boss,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitEffect {
    /// Passes through without effect.
    Ignore,
    DestroyMonkey,
    DamageBoss(u32),
    KillPlayer,
}

impl HitEffect {
    /// Does the projectile stop on this hit?
    pub fn consumes(self) -> bool {
        !matches!(self, HitEffect::Ignore)
    }
}

pub fn hit_effect(kind: ProjectileKind, target: Target) -> HitEffect {
    match (kind, target) {
        (ProjectileKind::Bullet, Target::Monkey) => HitEffect::DestroyMonkey,
        (ProjectileKind::Bullet, Target::Boss) => HitEffect::DamageBoss(1),
        (ProjectileKind::Banana, Target::Player) => HitEffect::KillPlayer,
        _ => HitEffect::Ignore,
    }
}

/// Move one projectile by one frame.
/// Returns true when it went inactive on this frame.
pub fn advance(p: &mut Projectile, max_range: f64, field: &Rect, platforms: &[Platform]) -> bool {
    if !p.active {
        return false;
    }

    p.body.x += p.vx;
    p.travelled += p.vx.abs();

    let bounds = p.body.bounds();
    let off_field = !field.intersects(&bounds);
    if p.travelled >= max_range || off_field || hits_platform(&bounds, platforms) {
        p.active = false;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Facing;
    use crate::domain::geometry::Size;

    const BULLET: Size = Size::new(12.0, 4.0);

    fn field() -> Rect {
        Rect { left: 0.0, top: 0.0, right: 1024.0, bottom: 768.0 }
    }

    fn bullet(x: f64, facing: Facing) -> Projectile {
        Projectile::new(ProjectileKind::Bullet, x, 300.0, BULLET, facing, 3.8)
    }

    #[test]
    fn hit_table() {
        use ProjectileKind::*;
        assert_eq!(hit_effect(Bullet, Target::Monkey), HitEffect::DestroyMonkey);
        assert_eq!(hit_effect(Bullet, Target::Boss), HitEffect::DamageBoss(1));
        assert_eq!(hit_effect(Bullet, Target::Player), HitEffect::Ignore);
        assert_eq!(hit_effect(Banana, Target::Player), HitEffect::KillPlayer);
        assert_eq!(hit_effect(Banana, Target::Monkey), HitEffect::Ignore);
        assert_eq!(hit_effect(Banana, Target::Boss), HitEffect::Ignore);
        assert!(!HitEffect::Ignore.consumes());
    }

    #[test]
    fn expires_at_max_range() {
        let mut b = bullet(500.0, Facing::Right);
        let mut frames = 0;
        while b.active {
            advance(&mut b, 300.0, &field(), &[]);
            frames += 1;
        }
        // 300 / 3.8 = 78.9..
        assert_eq!(frames, 79);
        assert!(b.travelled >= 300.0);
    }

    #[test]
    fn expires_off_field() {
        let mut b = bullet(10.0, Facing::Left);
        let mut frames = 0;
        while !advance(&mut b, 300.0, &field(), &[]) {
            frames += 1;
        }
        assert!(!b.active);
        assert!(b.body.right() <= 0.0);
        assert!(frames < 10);
    }

    #[test]
    fn stopped_by_platform() {
        let wall = Platform::new(540.0, 300.0, Size::new(20.0, 60.0));
        let mut b = bullet(500.0, Facing::Right);
        let mut frames = 0;
        while b.active {
            advance(&mut b, 300.0, &field(), std::slice::from_ref(&wall));
            frames += 1;
        }
        assert!(frames < 10);
    }

    #[test]
    fn inactive_projectiles_stay_put() {
        let mut b = bullet(500.0, Facing::Right);
        b.active = false;
        assert!(!advance(&mut b, 300.0, &field(), &[]));
        assert_eq!(b.body.x, 500.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distance_is_monotonic_and_bounded(
                x in 50.0f64..970.0,
                speed in 0.5f64..10.0,
                left in any::<bool>(),
            ) {
                let facing = if left { Facing::Left } else { Facing::Right };
                let mut p = Projectile::new(ProjectileKind::Banana, x, 300.0, BULLET, facing, speed);
                let mut last = 0.0;
                let mut frames = 0;
                while p.active {
                    advance(&mut p, 300.0, &field(), &[]);
                    prop_assert!(p.travelled > last);
                    last = p.travelled;
                    frames += 1;
                    prop_assert!(frames <= (300.0 / speed).ceil() as usize + 1);
                }
                prop_assert!(p.travelled < 300.0 + speed + 1e-6);
            }
        }
    }
}
