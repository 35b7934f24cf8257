/// Barrel-jump detector: awards a jump exactly once per genuine leap.
///
/// A jump counts when the player was recorded standing on one side of a
/// barrel, passed above it while falling, and comes down on the other
/// side. Each barrel keeps its own tracker; a global cooldown and the
/// height of the last award keep one leap over a cluster from paying out
/// several times.
///
/// ## Per-frame procedure
///
///   1. global cooldown -= 1
///   2. for each live barrel (tracker created on first sight):
///      a. tracker cooldown -= 1
///      b. close       = |dx| < pw/2 + bw/2 + horizontal_margin
///         side        = sign(dx) if |dx| > side_deadzone, else 0
///         above       = player center above barrel top, falling,
///                       within max_vertical of the barrel
///      c. grounded, free and not rising:
///           - finish a jump in progress once the player is clear of it
///           - remember the side while not close
///           - forget a finished pass-over
///      d. above && close && falling: mark above, jump in progress
///      e. moving_down = y > last tracked y; track y
///      f. award when every gate in `should_award` passes
///   3. drop trackers of barrels that are gone or destroyed

use std::collections::BTreeMap;

use super::entity::{Barrel, Player};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct JumpRules {
    pub horizontal_margin: f64,
    pub side_deadzone: f64,
    pub max_vertical: f64,
    /// Vertical distance from the last award that ends a jump in progress.
    pub reset_distance: f64,
    /// Minimum vertical distance between two awards.
    pub repeat_distance: f64,
    pub cooldown_frames: u32,
    pub global_cooldown_frames: u32,
}

#[derive(Clone, Debug, Default)]
struct Tracker {
    above: bool,
    jumped_over: bool,
    cooldown: u32,
    last_player_y: f64,
    /// -1 left of the barrel, 1 right, 0 unknown.
    side: i8,
    in_progress: bool,
}

#[derive(Clone, Debug)]
pub struct JumpDetector {
    rules: JumpRules,
    trackers: BTreeMap<u32, Tracker>,
    global_cooldown: u32,
    last_scored_y: Option<f64>,
}

impl JumpDetector {
    pub fn new(rules: JumpRules) -> Self {
        JumpDetector { rules, trackers: BTreeMap::new(), global_cooldown: 0, last_scored_y: None }
    }

    /// Number of barrels currently tracked.
    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.trackers.len()
    }

    /// Run one frame. Returns the ids of barrels jumped this frame.
    pub fn update(&mut self, player: &Player, barrels: &[Barrel]) -> Vec<u32> {
        let r = self.rules;
        let mut awarded = Vec::new();

        self.global_cooldown = self.global_cooldown.saturating_sub(1);

        let px = player.body.x;
        let py = player.body.y;
        let vy = player.motion.vy;
        let settled = player.motion.grounded && !player.is_climbing() && vy <= 0.0;

        for barrel in barrels.iter().filter(|b| !b.destroyed) {
            let bx = barrel.body.x;
            let by = barrel.body.y;
            let dx = px - bx;

            let close = dx.abs() < player.body.half_width() + barrel.body.half_width() + r.horizontal_margin;
            let side: i8 = if dx.abs() > r.side_deadzone {
                if dx > 0.0 { 1 } else { -1 }
            } else {
                0
            };
            let within_reach = (py - by).abs() <= r.max_vertical;
            let above = py < barrel.body.top() && vy > 0.0 && within_reach;
            let clear_of_last = |d: f64| self.last_scored_y.map_or(true, |y| (py - y).abs() > d);
            let finished = clear_of_last(r.reset_distance);
            let fresh_height = clear_of_last(r.repeat_distance);
            let global_ready = self.global_cooldown == 0;

            let t = self.trackers.entry(barrel.id).or_default();
            t.cooldown = t.cooldown.saturating_sub(1);

            if settled {
                if t.in_progress && (finished || !close) {
                    t.in_progress = false;
                }
                if !close && side != 0 {
                    t.side = side;
                }
                if t.above && !t.in_progress {
                    t.above = false;
                    t.jumped_over = false;
                }
            }

            if above && close {
                t.above = true;
                t.last_player_y = py;
                t.in_progress = true;
            }

            let moving_down = py > t.last_player_y;
            t.last_player_y = py;

            let should_award = t.above
                && moving_down
                && !t.jumped_over
                && t.cooldown == 0
                && global_ready
                && side != 0
                && t.side != 0
                && side != t.side
                && fresh_height
                && vy > 0.0
                && within_reach;

            if should_award {
                t.jumped_over = true;
                t.cooldown = r.cooldown_frames;
                self.global_cooldown = r.global_cooldown_frames;
                self.last_scored_y = Some(py);
                awarded.push(barrel.id);
                log::debug!("barrel {} jumped at y={:.1} (side {} -> {})", barrel.id, py, t.side, side);
            }
        }

        self.trackers.retain(|id, _| barrels.iter().any(|b| b.id == *id && !b.destroyed));
        awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Size;

    fn rules() -> JumpRules {
        JumpRules {
            horizontal_margin: 5.0,
            side_deadzone: 5.0,
            max_vertical: 80.0,
            reset_distance: 20.0,
            repeat_distance: 10.0,
            cooldown_frames: 30,
            global_cooldown_frames: 45,
        }
    }

    /// Barrel resting on a floor whose top edge is at `floor`.
    fn barrel(id: u32, x: f64, floor: f64) -> Barrel {
        let mut b = Barrel::new(id, x, floor - 16.0, Size::new(32.0, 32.0), 0.0);
        b.motion.grounded = true;
        b
    }

    fn player_at(x: f64, y: f64, vy: f64, grounded: bool) -> Player {
        let mut p = Player::new(x, y, Size::new(30.0, 40.0));
        p.motion.vy = vy;
        p.motion.grounded = grounded;
        p
    }

    /// Scripted leap from left to right over a barrel at `bx` on `floor`.
    /// Returns the number of awards seen over the whole leap.
    fn leap(det: &mut JumpDetector, barrels: &[Barrel], bx: f64, floor: f64) -> usize {
        let stand = floor - 20.0;
        let frames = [
            // standing well to the left
            (bx - 80.0, stand, 0.0, true),
            // rising toward the barrel
            (bx - 30.0, stand - 40.0, -3.0, false),
            // falling while above it
            (bx - 2.0, stand - 50.0, 1.0, false),
            (bx + 10.0, stand - 35.0, 3.0, false),
            // dropping below the barrel top on the far side
            (bx + 25.0, stand - 8.0, 4.0, false),
            // landed
            (bx + 30.0, stand, 0.0, true),
        ];
        frames
            .iter()
            .map(|&(x, y, vy, grounded)| det.update(&player_at(x, y, vy, grounded), barrels).len())
            .sum()
    }

    fn settle(det: &mut JumpDetector, barrels: &[Barrel], x: f64, floor: f64, frames: usize) {
        for _ in 0..frames {
            det.update(&player_at(x, floor - 20.0, 0.0, true), barrels);
        }
    }

    #[test]
    fn leap_over_barrel_scores_once() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0)];
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 1);
    }

    #[test]
    fn repeat_leap_inside_cooldown_scores_nothing() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0)];
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 1);
        // Straight back for another go: global cooldown still running.
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 0);
    }

    #[test]
    fn second_award_needs_a_new_height() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0), barrel(2, 500.0, 280.0)];
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 1);

        // Cooldowns expire, but the same height cannot pay out twice.
        settle(&mut det, &barrels, 300.0, 400.0, 60);
        settle(&mut det, &barrels, 100.0, 400.0, 1);
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 0);

        // One floor up is a fresh height.
        settle(&mut det, &barrels, 400.0, 280.0, 60);
        assert_eq!(leap(&mut det, &barrels, 500.0, 280.0), 1);
    }

    #[test]
    fn jumping_in_place_never_scores() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0)];
        let mut awards = 0;
        awards += det.update(&player_at(120.0, 380.0, 0.0, true), &barrels).len();
        awards += det.update(&player_at(190.0, 330.0, 1.0, false), &barrels).len();
        awards += det.update(&player_at(190.0, 372.0, 4.0, false), &barrels).len();
        assert_eq!(awards, 0);
    }

    #[test]
    fn rising_only_never_scores() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0)];
        det.update(&player_at(120.0, 380.0, 0.0, true), &barrels);
        for y in [360.0, 340.0, 330.0] {
            assert!(det.update(&player_at(230.0, y, -2.0, false), &barrels).is_empty());
        }
    }

    #[test]
    fn one_award_per_leap_over_a_cluster() {
        let mut det = JumpDetector::new(rules());
        let barrels = vec![barrel(1, 200.0, 400.0), barrel(2, 204.0, 400.0)];
        assert_eq!(leap(&mut det, &barrels, 202.0, 400.0), 1);
    }

    #[test]
    fn destroyed_barrels_are_ignored_and_purged() {
        let mut det = JumpDetector::new(rules());
        let mut barrels = vec![barrel(1, 200.0, 400.0), barrel(2, 600.0, 400.0)];
        det.update(&player_at(100.0, 380.0, 0.0, true), &barrels);
        assert_eq!(det.tracked(), 2);

        barrels[0].destroyed = true;
        assert_eq!(leap(&mut det, &barrels, 200.0, 400.0), 0);
        assert_eq!(det.tracked(), 1);
    }
}
