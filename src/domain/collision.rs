/// Collision resolution between movers and static platforms.
///
/// ## Landing (top-edge contact)
///
/// A mover lands on a platform when BOTH hold:
///   - its horizontal center lies within the platform span, and
///   - its bottom is within ±tolerance of the platform top, OR it
///     crossed the top this frame (prev_bottom ≤ top < bottom).
///
/// The player, while rising (vy < 0), only lands by crossing; the
/// tolerance band alone would otherwise catch it jumping up past a ledge.
///
/// Landing snaps the bottom edge onto the top, sets grounded and zeroes vy.
/// A mover that touches no top this frame becomes airborne.
///
/// ## Head bump (player only)
///
/// Rising, free (not climbing), center within a platform span, and the
/// player's top crossed that platform's bottom edge this frame → clamp just
/// below the platform and zero vy.

use super::entity::{Body, Platform, Player};
use super::geometry::{boxes_intersect, Rect};
use super::physics::{prev_bottom, Collidable, Mover};

/// Outcome of one landing pass for one mover.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Airborne,
    /// Was airborne, now standing on platform `n`.
    Landed(usize),
    /// Was already grounded and still is.
    Resting(usize),
}

impl Contact {
    pub fn is_grounded(self) -> bool {
        !matches!(self, Contact::Airborne)
    }
}

/// Pure top-edge test. `rising_needs_crossing` enables the player's
/// ascending guard.
pub fn lands_on(
    bounds: &Rect,
    prev_bottom: f64,
    vy: f64,
    platform: &Rect,
    tolerance: f64,
    rising_needs_crossing: bool,
) -> bool {
    if !platform.spans_x(bounds.center_x()) {
        return false;
    }
    let top = platform.top;
    let crossed = prev_bottom <= top && bounds.bottom > top;
    if rising_needs_crossing && vy < 0.0 {
        return crossed;
    }
    (bounds.bottom - top).abs() <= tolerance || crossed
}

/// Snap a mover's bottom edge onto `top`.
pub fn place_on_top<M: Mover + ?Sized>(mover: &mut M, top: f64) {
    let hh = mover.body().half_height();
    mover.body_mut().y = top - hh;
    let motion = mover.motion_mut();
    motion.vy = 0.0;
    motion.grounded = true;
}

/// Landing pass for one mover against every platform.
///
/// When several platform tops qualify, the highest one wins: that is the
/// first surface a falling body would have met.
pub fn land<M: Mover + ?Sized>(
    mover: &mut M,
    platforms: &[Platform],
    tolerance: f64,
    rising_needs_crossing: bool,
) -> Contact {
    let bounds = mover.bounds();
    let prev = prev_bottom(mover);
    let vy = mover.motion().vy;
    let was_grounded = mover.motion().grounded;

    let hit = platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| lands_on(&bounds, prev, vy, &p.bounds(), tolerance, rising_needs_crossing))
        .min_by(|(_, a), (_, b)| a.top().total_cmp(&b.top()))
        .map(|(i, p)| (i, p.top()));

    match hit {
        Some((i, top)) => {
            place_on_top(mover, top);
            if was_grounded { Contact::Resting(i) } else { Contact::Landed(i) }
        }
        None => {
            mover.motion_mut().grounded = false;
            Contact::Airborne
        }
    }
}

/// Head-bump pass for the player. Returns true when the player was clamped.
pub fn bump_head(player: &mut Player, platforms: &[Platform]) -> bool {
    if player.motion.vy >= 0.0 || player.is_climbing() {
        return false;
    }
    let hh = player.body.half_height();
    let top = player.body.top();
    let prev_top = player.motion.prev_y - hh;
    let cx = player.body.x;

    for p in platforms {
        let pb = p.bounds();
        if pb.spans_x(cx) && prev_top >= pb.bottom && top < pb.bottom {
            player.body.y = pb.bottom + hh;
            player.motion.vy = 0.0;
            return true;
        }
    }
    false
}

/// Keep a body's box inside `[0, width]`.
pub fn clamp_to_window(body: &mut Body, width: f64) {
    let hw = body.half_width();
    if width <= 2.0 * hw {
        body.x = width / 2.0;
    } else {
        body.x = body.x.clamp(hw, width - hw);
    }
}

/// Load-time correction: a body that overlaps a platform is lifted onto
/// that platform's top. Returns true when it was moved.
pub fn settle_on_platforms(body: &mut Body, platforms: &[Platform]) -> bool {
    let bounds = body.bounds();
    let overlap = platforms
        .iter()
        .filter(|p| boxes_intersect(&bounds, &p.bounds()))
        .map(|p| p.top())
        .min_by(f64::total_cmp);

    match overlap {
        Some(top) => {
            body.y = top - body.half_height();
            true
        }
        None => false,
    }
}

/// Is there a platform top at `foot_y` (± tolerance) under point `x`?
pub fn floor_at(x: f64, foot_y: f64, platforms: &[Platform], tolerance: f64) -> bool {
    platforms.iter().any(|p| {
        let b = p.bounds();
        b.spans_x(x) && (foot_y - b.top).abs() <= tolerance
    })
}

/// Does `rect` overlap any platform box?
pub fn hits_platform(rect: &Rect, platforms: &[Platform]) -> bool {
    platforms.iter().any(|p| boxes_intersect(rect, &p.bounds()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Barrel, ClimbState, LadderId};
    use crate::domain::geometry::Size;
    use crate::domain::physics::{integrate, PhysicsParams};

    const PLAYER: Size = Size::new(30.0, 40.0);
    const PLAYER_PHYSICS: PhysicsParams = PhysicsParams::new(0.2, 10.0);
    const TOL: f64 = 5.0;

    /// Platform whose top edge sits at `top`, spanning `[left, right]`.
    fn platform(left: f64, right: f64, top: f64) -> Platform {
        let w = right - left;
        Platform::new(left + w / 2.0, top + 8.0, Size::new(w, 16.0))
    }

    // ── Landing ──

    #[test]
    fn falling_player_lands_on_platform() {
        let platforms = vec![platform(50.0, 150.0, 550.0)];
        let mut p = Player::new(100.0, 500.0, PLAYER);

        let mut landed = 0;
        for _ in 0..200 {
            integrate(&mut p, PLAYER_PHYSICS);
            if let Contact::Landed(_) = land(&mut p, &platforms, TOL, true) {
                landed += 1;
            }
        }
        assert_eq!(landed, 1);
        assert_eq!(p.body.y, 550.0 - 20.0);
        assert_eq!(p.motion.vy, 0.0);
        assert!(p.motion.grounded);
    }

    #[test]
    fn fast_fall_caught_by_crossing() {
        // 10 px/frame: the tolerance band alone would miss the top.
        let platforms = vec![platform(0.0, 200.0, 300.0)];
        let mut b = Barrel::new(0, 100.0, 270.0, Size::new(32.0, 32.0), 0.0);
        b.motion.prev_y = 270.0;
        b.body.y = 290.0; // bottom 306, prev bottom 286
        b.motion.vy = 10.0;
        assert_eq!(land(&mut b, &platforms, TOL, false), Contact::Landed(0));
        assert_eq!(b.body.y, 300.0 - 16.0);
    }

    #[test]
    fn dropped_barrel_lands_once_and_stays_put() {
        const BARREL_PHYSICS: PhysicsParams = PhysicsParams::new(0.2, 5.0);
        let platforms = vec![platform(0.0, 400.0, 550.0)];
        let mut b = Barrel::new(0, 200.0, 100.0, Size::new(32.0, 32.0), 0.4);

        let mut landed = 0;
        for _ in 0..600 {
            integrate(&mut b, BARREL_PHYSICS);
            if let Contact::Landed(_) = land(&mut b, &platforms, TOL, false) {
                landed += 1;
            }
        }
        assert_eq!(landed, 1);
        assert_eq!(b.body.y, 550.0 - 16.0);
        assert!(b.motion.grounded);
    }

    #[test]
    fn rising_player_only_lands_by_crossing() {
        let r = Rect::centered(100.0, 0.0, PLAYER);
        let plat = platform(0.0, 200.0, 22.0).bounds();
        // bottom 20, within tolerance of top 22, but rising
        assert!(!lands_on(&r, 30.0, -2.0, &plat, TOL, true));
        // barrels have no such guard
        assert!(lands_on(&r, 30.0, -2.0, &plat, TOL, false));
    }

    #[test]
    fn center_outside_span_does_not_land() {
        let plat = platform(0.0, 100.0, 100.0).bounds();
        let r = Rect::centered(101.0, 80.0, PLAYER);
        assert!(!lands_on(&r, 100.0, 1.0, &plat, TOL, true));
    }

    #[test]
    fn walking_off_edge_becomes_airborne() {
        let platforms = vec![platform(0.0, 100.0, 100.0)];
        let mut p = Player::new(90.0, 80.0, PLAYER);
        p.motion.grounded = true;
        assert_eq!(land(&mut p, &platforms, TOL, true), Contact::Resting(0));

        p.body.x = 105.0;
        assert_eq!(land(&mut p, &platforms, TOL, true), Contact::Airborne);
        assert!(!p.motion.grounded);
    }

    #[test]
    fn highest_qualifying_top_wins() {
        let platforms = vec![platform(0.0, 200.0, 110.0), platform(0.0, 200.0, 104.0)];
        let mut b = Barrel::new(0, 100.0, 90.0, Size::new(32.0, 32.0), 0.0);
        b.motion.prev_y = 80.0; // prev bottom 96
        b.body.y = 98.0; // bottom 114
        assert_eq!(land(&mut b, &platforms, TOL, false), Contact::Landed(1));
        assert_eq!(b.body.y, 104.0 - 16.0);
    }

    // ── Head bump ──

    #[test]
    fn head_bump_clamps_under_platform() {
        let platforms = vec![platform(0.0, 200.0, 84.0)]; // bottom edge 100
        let mut p = Player::new(100.0, 118.0, PLAYER); // top 98
        p.motion.prev_y = 122.0; // prev top 102
        p.motion.vy = -4.0;
        assert!(bump_head(&mut p, &platforms));
        assert_eq!(p.body.top(), 100.0);
        assert_eq!(p.motion.vy, 0.0);
    }

    #[test]
    fn no_head_bump_while_climbing() {
        let platforms = vec![platform(0.0, 200.0, 84.0)];
        let mut p = Player::new(100.0, 118.0, PLAYER);
        p.motion.prev_y = 122.0;
        p.motion.vy = -4.0;
        p.climb = ClimbState::Climbing { ladder: LadderId(0) };
        assert!(!bump_head(&mut p, &platforms));
    }

    // ── Bounds / placement ──

    #[test]
    fn clamp_keeps_box_inside_window() {
        let mut b = Body::new(-5.0, 0.0, PLAYER);
        clamp_to_window(&mut b, 1024.0);
        assert_eq!(b.left(), 0.0);
        b.x = 2000.0;
        clamp_to_window(&mut b, 1024.0);
        assert_eq!(b.right(), 1024.0);
    }

    #[test]
    fn overlapping_body_is_settled_on_top() {
        let platforms = vec![platform(0.0, 200.0, 100.0)];
        let mut b = Body::new(50.0, 105.0, PLAYER);
        assert!(settle_on_platforms(&mut b, &platforms));
        assert_eq!(b.bottom(), 100.0);

        let mut clear = Body::new(50.0, 40.0, PLAYER);
        assert!(!settle_on_platforms(&mut clear, &platforms));
        assert_eq!(clear.y, 40.0);
    }

    #[test]
    fn floor_probe_uses_tolerance() {
        let platforms = vec![platform(0.0, 100.0, 100.0)];
        assert!(floor_at(50.0, 103.0, &platforms, TOL));
        assert!(!floor_at(50.0, 110.0, &platforms, TOL));
        assert!(!floor_at(120.0, 100.0, &platforms, TOL));
    }
}
