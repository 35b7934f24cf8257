/// Ladder climbing state machine.
///
/// States: `Free`, `Climbing { ladder }` (see `entity::ClimbState`).
///
/// ### Free → Climbing
/// ┌──────────────────────────────────────────────┬──────────┐
/// │ Condition                                     │ Enter?   │
/// ├──────────────────────────────────────────────┼──────────┤
/// │ neither Up nor Down held                      │ NO       │
/// │ Down, grounded, feet at ladder top (±top_win) │ YES      │
/// │   and |dx| < ladder half width + margin       │          │
/// │ center inside ladder box, Up held             │ YES      │
/// │ center inside ladder box, Down held, ladder   │ YES      │
/// │   continues below the feet                    │          │
/// │ otherwise                                     │ NO       │
/// └──────────────────────────────────────────────┴──────────┘
///
/// ### Climbing → Free (checked in this order; first match wins)
/// ┌──────────────────────────────────────────────┬──────────────────────┐
/// │ Condition                                     │ Result               │
/// ├──────────────────────────────────────────────┼──────────────────────┤
/// │ ladder id dangling                            │ Free, airborne       │
/// │ top above ladder top, platform at ladder top, │ Free, stand on it    │
/// │   feet level with it, Down NOT held           │   (Down held: stay)  │
/// │ top above ladder top, no platform there       │ clamp at ladder top  │
/// │ feet below ladder bottom, platform there      │ Free, stand on it    │
/// │ feet below ladder bottom, no platform         │ clamp at ladder foot │
/// │ center beyond ladder span ± margin            │ Free, airborne       │
/// └──────────────────────────────────────────────┴──────────────────────┘
///
/// At most one transition happens per call.

use super::collision::place_on_top;
use super::entity::{ClimbState, FrameInput, Ladder, LadderId, Platform, Player};
use super::physics::Collidable;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ClimbRules {
    pub climb_speed: f64,
    /// Horizontal slack around the ladder for stepping off / entering from above.
    pub edge_margin: f64,
    /// How close a platform top must be to the ladder top to count as its landing.
    pub top_window: f64,
    /// How close a platform top must be to the ladder foot.
    pub bottom_window: f64,
    /// Gap left between feet and platform when stepping off at the top.
    pub placement_offset: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClimbTransition {
    Stay,
    Entered(LadderId),
    ExitedTop,
    ExitedBottom,
    SteppedOff,
    /// The ladder link pointed nowhere.
    Detached,
}

/// Vertical climbing motion for this frame. No-op while free.
pub fn climb_motion(player: &mut Player, input: &FrameInput, speed: f64) {
    if !player.is_climbing() {
        return;
    }
    if input.up {
        player.body.y -= speed;
    }
    if input.down {
        player.body.y += speed;
    }
    player.motion.vy = 0.0;
}

/// Run the state machine once.
pub fn update(
    player: &mut Player,
    ladders: &[Ladder],
    platforms: &[Platform],
    input: &FrameInput,
    rules: &ClimbRules,
) -> ClimbTransition {
    match player.climb {
        ClimbState::Free => try_enter(player, ladders, input, rules),
        ClimbState::Climbing { ladder } => match ladders.get(ladder.0) {
            Some(l) => check_exit(player, l, platforms, input, rules),
            None => {
                release(player, false);
                ClimbTransition::Detached
            }
        },
    }
}

fn try_enter(
    player: &mut Player,
    ladders: &[Ladder],
    input: &FrameInput,
    rules: &ClimbRules,
) -> ClimbTransition {
    if !input.up && !input.down {
        return ClimbTransition::Stay;
    }

    if input.down && player.motion.grounded {
        if let Some(i) = ladders.iter().position(|l| standing_on_top(player, l, rules)) {
            return enter(player, LadderId(i));
        }
    }

    let found = ladders.iter().position(|l| {
        let lb = l.bounds();
        let inside = lb.contains(player.body.x, player.body.y);
        inside && (input.up || (input.down && player.body.bottom() < lb.bottom - rules.climb_speed))
    });
    match found {
        Some(i) => enter(player, LadderId(i)),
        None => ClimbTransition::Stay,
    }
}

fn standing_on_top(player: &Player, ladder: &Ladder, rules: &ClimbRules) -> bool {
    (player.body.x - ladder.body.x).abs() < ladder.body.half_width() + rules.edge_margin
        && (player.body.bottom() - ladder.body.top()).abs() < rules.top_window
}

fn enter(player: &mut Player, id: LadderId) -> ClimbTransition {
    player.climb = ClimbState::Climbing { ladder: id };
    player.motion.vy = 0.0;
    player.motion.grounded = false;
    log::debug!("player started climbing ladder {}", id.0);
    ClimbTransition::Entered(id)
}

fn release(player: &mut Player, grounded: bool) {
    player.climb = ClimbState::Free;
    player.motion.grounded = grounded;
}

fn check_exit(
    player: &mut Player,
    ladder: &Ladder,
    platforms: &[Platform],
    input: &FrameInput,
    rules: &ClimbRules,
) -> ClimbTransition {
    let lb = ladder.bounds();
    let hh = player.body.half_height();

    // ── Top ──
    if player.body.top() < lb.top {
        let landing = platforms.iter().find(|p| {
            (p.top() - lb.top).abs() < rules.top_window && p.bounds().spans_x(player.body.x)
        });
        match landing {
            Some(p) => {
                let top = p.top();
                if player.body.bottom() <= top + rules.placement_offset && !input.down {
                    release(player, true);
                    player.body.y = top - hh - rules.placement_offset;
                    player.motion.vy = 0.0;
                    return ClimbTransition::ExitedTop;
                }
            }
            None => player.body.y = lb.top + hh,
        }
    }

    // ── Bottom ──
    if player.body.bottom() > lb.bottom + rules.placement_offset {
        let floor = platforms.iter().find(|p| {
            (p.top() - lb.bottom).abs() < rules.bottom_window && p.bounds().spans_x(player.body.x)
        });
        if let Some(p) = floor {
            let top = p.top();
            release(player, true);
            place_on_top(player, top);
            return ClimbTransition::ExitedBottom;
        }
        player.body.y = lb.bottom - hh;
    }

    // ── Sides ──
    let x = player.body.x;
    if x < lb.left - rules.edge_margin || x > lb.right + rules.edge_margin {
        release(player, false);
        return ClimbTransition::SteppedOff;
    }

    ClimbTransition::Stay
}
