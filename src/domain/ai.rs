/// Monkey AI: patrol walking with edge avoidance, and banana timing.
///
/// A monkey walks at a fixed speed in its facing direction. It turns
/// around when
///   1. it is grounded and its leading edge would step past every
///      platform under its feet, or
///   2. it has walked the current patrol distance.
///
/// Each turn-around resets the distance walked and advances the patrol
/// index (wrapping). An empty patrol list never turns on distance.

use super::collision::{floor_at, land, Contact};
use super::entity::{Monkey, MonkeyKind, Platform};
use super::physics::{integrate, PhysicsParams};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PatrolRules {
    pub speed: f64,
    pub physics: PhysicsParams,
    /// Vertical slack when probing for floor and when landing.
    pub tolerance: f64,
}

fn turn_around(m: &mut Monkey) {
    m.facing = m.facing.reversed();
    m.travelled = 0.0;
    if !m.patrol.is_empty() {
        m.patrol_index = (m.patrol_index + 1) % m.patrol.len();
    }
}

/// Would the next step put the leading edge over empty space?
fn at_edge(m: &Monkey, platforms: &[Platform], speed: f64, tolerance: f64) -> bool {
    let sign = m.facing.sign();
    let lead = m.body.x + sign * (m.body.half_width() + speed);
    !floor_at(lead, m.body.bottom(), platforms, tolerance)
}

/// Advance one monkey by one frame.
pub fn patrol(m: &mut Monkey, platforms: &[Platform], rules: &PatrolRules) -> Contact {
    if m.destroyed {
        return Contact::Airborne;
    }

    if m.motion.grounded && at_edge(m, platforms, rules.speed, rules.tolerance) {
        turn_around(m);
    }

    m.motion.vx = m.facing.sign() * rules.speed;
    integrate(m, rules.physics);
    m.travelled += m.motion.vx.abs();

    if let Some(&limit) = m.patrol.get(m.patrol_index) {
        if m.travelled >= limit {
            turn_around(m);
        }
    }

    land(m, platforms, rules.tolerance, false)
}

/// Count down the banana timer of an intelligent monkey.
/// Returns true on the frame a banana should be thrown; the timer restarts.
pub fn ready_to_throw(m: &mut Monkey, interval: u32) -> bool {
    if m.destroyed {
        return false;
    }
    match &mut m.kind {
        MonkeyKind::Normal => false,
        MonkeyKind::Intelligent { banana_cooldown } => {
            *banana_cooldown = banana_cooldown.saturating_sub(1);
            if *banana_cooldown == 0 {
                *banana_cooldown = interval;
                true
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Facing;
    use crate::domain::geometry::Size;

    const MONKEY: Size = Size::new(32.0, 32.0);

    fn rules() -> PatrolRules {
        PatrolRules { speed: 0.5, physics: PhysicsParams::new(0.4, 5.0), tolerance: 5.0 }
    }

    fn floor(left: f64, right: f64, top: f64) -> Platform {
        let w = right - left;
        Platform::new(left + w / 2.0, top + 8.0, Size::new(w, 16.0))
    }

    fn grounded_monkey(x: f64, facing: Facing, patrol: Vec<f64>) -> Monkey {
        let mut m = Monkey::new(MonkeyKind::Normal, x, 400.0 - 16.0, MONKEY, facing, patrol);
        m.motion.grounded = true;
        m
    }

    #[test]
    fn turns_after_patrol_distance() {
        let platforms = vec![floor(0.0, 1000.0, 400.0)];
        let mut m = grounded_monkey(500.0, Facing::Right, vec![10.0, 4.0]);
        let r = rules();

        for _ in 0..20 {
            patrol(&mut m, &platforms, &r);
        }
        assert_eq!(m.facing, Facing::Left);
        assert_eq!(m.patrol_index, 1);
        assert_eq!(m.body.x, 510.0);

        for _ in 0..8 {
            patrol(&mut m, &platforms, &r);
        }
        // Second leg is 4 px, then the list wraps.
        assert_eq!(m.facing, Facing::Right);
        assert_eq!(m.patrol_index, 0);
        assert_eq!(m.body.x, 506.0);
    }

    #[test]
    fn empty_patrol_never_turns_on_distance() {
        let platforms = vec![floor(0.0, 1000.0, 400.0)];
        let mut m = grounded_monkey(100.0, Facing::Right, Vec::new());
        for _ in 0..400 {
            patrol(&mut m, &platforms, &rules());
        }
        assert_eq!(m.facing, Facing::Right);
        assert_eq!(m.body.x, 300.0);
    }

    #[test]
    fn turns_at_platform_edge() {
        let platforms = vec![floor(0.0, 200.0, 400.0)];
        let mut m = grounded_monkey(180.0, Facing::Right, vec![1000.0]);
        for _ in 0..20 {
            patrol(&mut m, &platforms, &rules());
        }
        assert_eq!(m.facing, Facing::Left);
        assert!(m.body.right() <= 200.0);
        assert!(m.motion.grounded);
    }

    #[test]
    fn walks_across_adjacent_segments() {
        let platforms = vec![floor(0.0, 128.0, 400.0), floor(128.0, 256.0, 400.0)];
        let mut m = grounded_monkey(100.0, Facing::Right, Vec::new());
        for _ in 0..100 {
            patrol(&mut m, &platforms, &rules());
        }
        assert_eq!(m.facing, Facing::Right);
        assert_eq!(m.body.x, 150.0);
    }

    #[test]
    fn airborne_monkey_falls_and_lands() {
        let platforms = vec![floor(0.0, 1000.0, 400.0)];
        let mut m = Monkey::new(MonkeyKind::Normal, 500.0, 300.0, MONKEY, Facing::Left, Vec::new());
        let mut landed = false;
        for _ in 0..100 {
            if let Contact::Landed(_) = patrol(&mut m, &platforms, &rules()) {
                landed = true;
            }
        }
        assert!(landed);
        assert_eq!(m.body.bottom(), 400.0);
    }

    #[test]
    fn banana_timer_counts_frames() {
        let mut m = Monkey::new(
            MonkeyKind::Intelligent { banana_cooldown: 300 },
            0.0, 0.0, MONKEY, Facing::Left, Vec::new(),
        );
        let throws: Vec<usize> = (1..=900).filter(|_| ready_to_throw(&mut m, 300)).collect();
        assert_eq!(throws, vec![300, 600, 900]);
    }

    #[test]
    fn normal_monkeys_never_throw() {
        let mut m = grounded_monkey(0.0, Facing::Left, Vec::new());
        assert!((0..1000).all(|_| !ready_to_throw(&mut m, 300)));
    }
}
