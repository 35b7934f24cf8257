/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Intent (walk, climb motion, jump)
///   2. Integration (player, barrels, boss, ladders) + window clamp
///   3. Platform landing (falling ladders pin on first landing)
///   4. Head bump
///   5. Ladder state machine
///   6. Monkeys (patrol, bananas)
///   7. Pickups
///   8. Fire
///   9. Projectiles (movement, bullet hits)
///  10. Barrel-jump detector
///  11. Win / lose evaluation
///  12. Purge of destroyed entities
///
/// Nothing here reads a clock: a frame is the unit of time.

use crate::domain::ai;
use crate::domain::climbing::{self, ClimbTransition};
use crate::domain::collision::{bump_head, clamp_to_window, land};
use crate::domain::entity::{Facing, FrameInput, Projectile, ProjectileKind};
use crate::domain::geometry::boxes_intersect;
use crate::domain::physics::{integrate, Collidable};
use crate::domain::projectile::{self, hit_effect, HitEffect, Target};
use super::event::GameEvent;
use super::world::{FrameResult, WorldState};

/// Result of one frame plus what happened during it.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub result: FrameResult,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: &FrameInput) -> StepReport {
    if let Some(done) = world.outcome {
        return StepReport { result: done, events: vec![] };
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;

    resolve_intent(world, input, &mut events);
    resolve_motion(world);
    resolve_platforms(world);
    bump_head(&mut world.player, &world.platforms);
    resolve_ladders(world, input);
    resolve_monkeys(world, &mut events);
    resolve_pickups(world, &mut events);
    resolve_fire(world, input, &mut events);
    resolve_projectiles(world, &mut events);
    resolve_barrel_jumps(world, &mut events);
    let result = evaluate(world, &mut events);
    purge(world);

    if result.is_over() {
        world.outcome = Some(result);
        log::info!(
            "level {} ({}) ended on frame {}: {:?}",
            world.level_index + 1, world.name, world.frame, result
        );
    }

    StepReport { result, events }
}

// ══════════════════════════════════════════════════════════════
// Player intent
// ══════════════════════════════════════════════════════════════

fn resolve_intent(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let speed = world.config.player.move_speed;
    let width = world.config.window_width;
    let p = &mut world.player;

    // Airborne players keep their horizontal momentum.
    if p.motion.grounded || p.is_climbing() {
        p.motion.vx = 0.0;
    }

    // Movement that would leave the window is dropped.
    if input.left && !input.right {
        p.facing = Facing::Left;
        p.motion.vx = if p.body.left() - speed >= 0.0 { -speed } else { 0.0 };
    } else if input.right && !input.left {
        p.facing = Facing::Right;
        p.motion.vx = if p.body.right() + speed <= width { speed } else { 0.0 };
    }

    climbing::climb_motion(p, input, world.config.player.climb_speed);

    if input.jump && p.motion.grounded && !p.is_climbing() {
        p.motion.vy = world.config.player.jump_velocity;
        p.motion.grounded = false;
        events.push(GameEvent::Jumped);
    }
}

// ══════════════════════════════════════════════════════════════
// Integration + platforms
// ══════════════════════════════════════════════════════════════

fn resolve_motion(world: &mut WorldState) {
    let phys = &world.config.physics;

    integrate(&mut world.player, phys.player);
    clamp_to_window(&mut world.player.body, world.config.window_width);

    for b in world.barrels.iter_mut().filter(|b| !b.destroyed) {
        integrate(b, phys.barrel);
    }
    integrate(&mut world.boss, phys.boss);
    for l in world.ladders.iter_mut() {
        integrate(l, world.ladder_physics);
    }
}

fn resolve_platforms(world: &mut WorldState) {
    let tol = world.config.tuning.landing_tolerance;
    let platforms = &world.platforms;

    if !world.player.is_climbing() {
        land(&mut world.player, platforms, tol, true);
    }
    for b in world.barrels.iter_mut().filter(|b| !b.destroyed) {
        land(b, platforms, tol, false);
    }
    land(&mut world.boss, platforms, tol, false);

    for l in world.ladders.iter_mut().filter(|l| !l.pinned) {
        if land(l, platforms, tol, false).is_grounded() {
            l.pinned = true;
        }
    }
}

fn resolve_ladders(world: &mut WorldState, input: &FrameInput) {
    let rules = world.config.climb_rules();
    let t = climbing::update(&mut world.player, &world.ladders, &world.platforms, input, &rules);
    if t != ClimbTransition::Stay {
        log::debug!("frame {}: ladder {:?}", world.frame, t);
    }
}

// ══════════════════════════════════════════════════════════════
// Monkeys, pickups, projectiles
// ══════════════════════════════════════════════════════════════

fn resolve_monkeys(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let rules = world.config.patrol_rules();
    let tuning = &world.config.tuning;
    let banana = world.config.sizes.banana;

    for m in world.monkeys.iter_mut().filter(|m| !m.destroyed) {
        ai::patrol(m, &world.platforms, &rules);

        if ai::ready_to_throw(m, tuning.banana_interval_frames) {
            world.projectiles.push(Projectile::new(
                ProjectileKind::Banana,
                m.body.x,
                m.body.y,
                banana,
                m.facing,
                tuning.banana_speed,
            ));
            events.push(GameEvent::BananaThrown);
        }
    }
}

fn resolve_pickups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    use crate::domain::entity::PickupKind;

    let player_box = world.player.bounds();
    for item in world.pickups.iter_mut().filter(|i| !i.collected) {
        if !boxes_intersect(&player_box, &item.bounds()) {
            continue;
        }
        item.collected = true;
        match item.kind {
            PickupKind::Hammer => {
                world.player.collect_hammer();
                events.push(GameEvent::HammerCollected);
            }
            PickupKind::Blaster => {
                world.player.collect_blaster(world.config.tuning.blaster_bullets);
                events.push(GameEvent::BlasterCollected);
            }
        }
    }
}

fn resolve_fire(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if !input.fire || !world.player.take_bullet() {
        return;
    }
    let p = &world.player;
    world.projectiles.push(Projectile::new(
        ProjectileKind::Bullet,
        p.body.x,
        p.body.y,
        world.config.sizes.bullet,
        p.facing,
        world.config.tuning.bullet_speed,
    ));
    events.push(GameEvent::BulletFired);
}

fn resolve_projectiles(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let range = world.config.tuning.projectile_range;
    let field = world.config.field();
    let monkey_points = world.config.scoring.monkey;

    for shot in world.projectiles.iter_mut() {
        projectile::advance(shot, range, &field, &world.platforms);
        if !shot.active {
            continue;
        }
        let shot_box = shot.bounds();

        // First live monkey it touches.
        if let Some(m) = world.monkeys.iter_mut()
            .find(|m| !m.destroyed && boxes_intersect(&shot_box, &m.bounds()))
        {
            let effect = hit_effect(shot.kind, Target::Monkey);
            if effect == HitEffect::DestroyMonkey {
                m.destroyed = true;
                world.score.add(monkey_points);
                events.push(GameEvent::MonkeyDestroyed);
            }
            if effect.consumes() {
                shot.active = false;
                continue;
            }
        }

        if !world.boss.is_defeated() && boxes_intersect(&shot_box, &world.boss.bounds()) {
            if let HitEffect::DamageBoss(n) = hit_effect(shot.kind, Target::Boss) {
                world.boss.take_damage(n);
                shot.active = false;
                events.push(GameEvent::BossHit { health: world.boss.health });
            }
        }
    }
}

fn resolve_barrel_jumps(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let points = world.config.scoring.barrel_jump;
    for id in world.jump_detector.update(&world.player, &world.barrels) {
        world.score.add(points);
        events.push(GameEvent::BarrelJumped { id });
    }
}

// ══════════════════════════════════════════════════════════════
// Win / lose
// ══════════════════════════════════════════════════════════════

fn evaluate(world: &mut WorldState, events: &mut Vec<GameEvent>) -> FrameResult {
    if world.frame >= world.config.max_frames {
        events.push(GameEvent::TimeUp);
        return FrameResult::Lose(world.score());
    }

    let player_box = world.player.bounds();
    let hammer = world.player.has_hammer();

    // ── Boss contact ──
    // Checked whatever the boss's health: touching him unarmed always loses.
    if boxes_intersect(&player_box, &world.boss.bounds()) {
        if hammer {
            world.boss.defeat();
            events.push(GameEvent::BossDefeated);
            return clear_level(world, events);
        }
        events.push(GameEvent::PlayerKilled);
        return FrameResult::Lose(world.score());
    }

    // ── Boss worn down by bullets ──
    if world.boss.is_defeated() {
        events.push(GameEvent::BossDefeated);
        return clear_level(world, events);
    }

    // ── Barrels ──
    let smash = world.config.scoring.barrel_smash;
    for b in world.barrels.iter_mut().filter(|b| !b.destroyed) {
        if boxes_intersect(&player_box, &b.bounds()) {
            if !hammer {
                events.push(GameEvent::PlayerKilled);
                return FrameResult::Lose(world.score.score());
            }
            b.destroyed = true;
            world.score.add(smash);
            events.push(GameEvent::BarrelSmashed { id: b.id });
        }
    }

    // ── Monkeys ──
    let monkey_points = world.config.scoring.monkey;
    for m in world.monkeys.iter_mut().filter(|m| !m.destroyed) {
        if boxes_intersect(&player_box, &m.bounds()) {
            if !hammer {
                events.push(GameEvent::PlayerKilled);
                return FrameResult::Lose(world.score.score());
            }
            m.destroyed = true;
            world.score.add(monkey_points);
            events.push(GameEvent::MonkeyDestroyed);
        }
    }

    // ── Bananas ──
    let hit_by_banana = world.projectiles.iter()
        .filter(|p| p.active && boxes_intersect(&player_box, &p.bounds()))
        .any(|p| hit_effect(p.kind, Target::Player) == HitEffect::KillPlayer);
    if hit_by_banana {
        events.push(GameEvent::PlayerKilled);
        return FrameResult::Lose(world.score());
    }

    FrameResult::Continue
}

/// The boss is beaten: win on the final level, otherwise move on.
fn clear_level(world: &mut WorldState, events: &mut Vec<GameEvent>) -> FrameResult {
    if world.is_final_level {
        let secs = world.remaining_seconds();
        world.score.add_time_bonus(secs);
        events.push(GameEvent::GameWon);
        FrameResult::Win(world.score())
    } else {
        events.push(GameEvent::LevelCleared);
        FrameResult::AdvanceLevel
    }
}

fn purge(world: &mut WorldState) {
    world.barrels.retain(|b| !b.destroyed);
    world.monkeys.retain(|m| !m.destroyed);
    world.projectiles.retain(|p| p.active);
    world.pickups.retain(|p| !p.collected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::domain::entity::{
        Barrel, Ladder, Monkey, MonkeyKind, Pickup, PickupKind, Platform, Player, Weapon,
    };
    use crate::domain::geometry::Size;

    const FLOOR_TOP: f64 = 752.0;

    /// One long floor, player standing at x = 100, boss far away.
    fn arena() -> WorldState {
        let cfg = SimConfig::default();
        let mut w = WorldState::new(cfg.clone(), 0, true, 0);
        w.name = "arena".into();
        w.platforms.push(Platform::new(512.0, FLOOR_TOP + 8.0, Size::new(1024.0, 16.0)));
        w.player = standing_player(&cfg, 100.0);
        w.boss.body.x = 900.0;
        w.boss.body.y = FLOOR_TOP - cfg.sizes.boss.height / 2.0;
        w.boss.motion.grounded = true;
        w
    }

    fn standing_player(cfg: &SimConfig, x: f64) -> Player {
        let mut p = Player::new(x, FLOOR_TOP - cfg.sizes.player.height / 2.0, cfg.sizes.player);
        p.motion.grounded = true;
        p
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn right() -> FrameInput {
        FrameInput { right: true, ..FrameInput::default() }
    }

    fn run(w: &mut WorldState, input: FrameInput, frames: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(step(w, &input).events);
        }
        events
    }

    // ── Movement ──

    #[test]
    fn walking_moves_at_move_speed() {
        let mut w = arena();
        run(&mut w, right(), 10);
        assert!((w.player.body.x - 135.0).abs() < 1e-9);
        assert!(w.player.motion.grounded);
        assert_eq!(w.player.facing, Facing::Right);
    }

    #[test]
    fn movement_into_window_edge_is_dropped() {
        let mut w = arena();
        w.player.body.x = 16.0;
        let left = FrameInput { left: true, ..FrameInput::default() };
        run(&mut w, left, 5);
        assert_eq!(w.player.body.x, 16.0);
        assert_eq!(w.player.facing, Facing::Left);
    }

    #[test]
    fn jump_rises_and_lands_again() {
        let mut w = arena();
        let start_y = w.player.body.y;
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        let events = step(&mut w, &jump).events;
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(w.player.body.y < start_y);

        run(&mut w, idle(), 120);
        assert_eq!(w.player.body.y, start_y);
        assert!(w.player.motion.grounded);
    }

    #[test]
    fn no_jump_in_mid_air() {
        let mut w = arena();
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        step(&mut w, &jump);
        let events = step(&mut w, &jump).events;
        assert!(events.is_empty());
    }

    // ── Boss ──

    #[test]
    fn boss_contact_with_hammer_wins_with_bonus() {
        let mut w = arena();
        w.player.collect_hammer();
        w.player.body.x = w.boss.body.x - 40.0;
        let report = step(&mut w, &idle());

        // frame 1 of 10800: 10799 / 60 = 179 seconds left
        assert_eq!(report.result, FrameResult::Win(179 * 3));
        assert!(report.events.contains(&GameEvent::GameWon));
        assert!(w.boss.is_defeated());
    }

    #[test]
    fn boss_contact_on_early_level_advances_without_bonus() {
        let mut w = arena();
        w.is_final_level = false;
        w.score.add(60);
        w.player.collect_hammer();
        w.player.body.x = w.boss.body.x - 40.0;
        assert_eq!(step(&mut w, &idle()).result, FrameResult::AdvanceLevel);
        assert_eq!(w.score(), 60);
        assert_eq!(w.score.base(), 60);
    }

    #[test]
    fn boss_contact_without_hammer_loses() {
        let mut w = arena();
        w.score.add(30);
        w.player.body.x = w.boss.body.x - 40.0;
        assert_eq!(step(&mut w, &idle()).result, FrameResult::Lose(30));
    }

    #[derive(Clone, Copy, Debug)]
    enum Approach {
        Left,
        Right,
        /// Falling onto the boss's head.
        Above,
        /// Jumping up into a boss that is in mid-air.
        Below,
    }

    /// Place the player one frame away from touching the boss.
    fn approach_boss(w: &mut WorldState, from: Approach) {
        let boss = w.boss.body;
        let p = &mut w.player;
        match from {
            Approach::Left => p.body.x = boss.x - 40.0,
            Approach::Right => p.body.x = boss.x + 40.0,
            Approach::Above => {
                p.body.x = boss.x;
                p.body.y = boss.top() - p.body.half_height() - 2.0;
                p.motion.prev_y = p.body.y;
                p.motion.vy = 3.0;
                p.motion.grounded = false;
            }
            Approach::Below => {
                w.boss.body.y = 600.0;
                w.boss.motion.prev_y = 600.0;
                w.boss.motion.grounded = false;
                let boss_bottom = w.boss.body.bottom();
                p.body.x = boss.x;
                p.body.y = boss_bottom + p.body.half_height() + 2.0;
                p.motion.prev_y = p.body.y;
                p.motion.vy = -4.0;
                p.motion.grounded = false;
            }
        }
    }

    #[test]
    fn boss_contact_from_every_side() {
        let sides = [Approach::Left, Approach::Right, Approach::Above, Approach::Below];
        for from in sides {
            for armed in [false, true] {
                let mut w = arena();
                if armed {
                    w.player.collect_hammer();
                }
                approach_boss(&mut w, from);
                let result = step(&mut w, &idle()).result;
                let expected = if armed { FrameResult::Win(179 * 3) } else { FrameResult::Lose(0) };
                assert_eq!(result, expected, "{from:?}, hammer: {armed}");
            }
        }
    }

    /// A live bullet sitting inside the boss, about to land the final hit.
    fn finishing_shot(w: &mut WorldState) {
        w.boss.max_health = 1;
        w.boss.health = 1;
        let cfg = w.config.clone();
        w.projectiles.push(Projectile::new(
            ProjectileKind::Bullet, w.boss.body.x + 20.0, w.boss.body.y, cfg.sizes.bullet, Facing::Right, 3.8,
        ));
    }

    #[test]
    fn unarmed_contact_loses_even_when_a_bullet_kills_the_boss() {
        let mut w = arena();
        finishing_shot(&mut w);
        w.player.body.x = w.boss.body.x - 40.0;

        let report = step(&mut w, &idle());
        assert_eq!(report.result, FrameResult::Lose(0));
        assert!(w.boss.is_defeated());
        assert!(report.events.contains(&GameEvent::PlayerKilled));
        assert!(!report.events.contains(&GameEvent::GameWon));
    }

    #[test]
    fn bullet_kill_beats_a_same_frame_barrel_touch() {
        let mut w = arena();
        let cfg = w.config.clone();
        finishing_shot(&mut w);
        let mut b = Barrel::new(0, 120.0, FLOOR_TOP - 16.0, cfg.sizes.barrel, 0.0);
        b.motion.grounded = true;
        w.barrels.push(b);

        let report = step(&mut w, &idle());
        assert_eq!(report.result, FrameResult::Win(179 * 3));
        assert!(report.events.contains(&GameEvent::BossDefeated));
        assert!(!report.events.contains(&GameEvent::PlayerKilled));
    }

    #[test]
    fn finished_level_stays_finished() {
        let mut w = arena();
        w.player.body.x = w.boss.body.x - 40.0;
        let first = step(&mut w, &idle()).result;
        let frame = w.frame;
        let x = w.player.body.x;

        let again = step(&mut w, &right());
        assert_eq!(again.result, first);
        assert!(again.events.is_empty());
        assert_eq!(w.frame, frame);
        assert_eq!(w.player.body.x, x);
    }

    #[test]
    fn bullets_wear_the_boss_down_and_bonus_applies_once() {
        let mut w = arena();
        w.boss.max_health = 2;
        w.boss.health = 2;
        w.player.body.x = w.boss.body.x - 200.0;
        w.player.collect_blaster(5);
        let fire = FrameInput { fire: true, ..FrameInput::default() };

        let mut result = FrameResult::Continue;
        let mut wins = 0;
        for _ in 0..200 {
            let input = if w.frame % 60 == 0 { fire } else { idle() };
            let r = step(&mut w, &input);
            wins += r.events.iter().filter(|e| **e == GameEvent::GameWon).count();
            result = r.result;
            if result.is_over() {
                break;
            }
        }
        let bonus = w.remaining_seconds() * 3;
        assert_eq!(result, FrameResult::Win(bonus));
        assert_eq!(wins, 1);
        assert_eq!(w.player.bullets(), 3);

        // Latched: a later update does not add the bonus again.
        assert_eq!(step(&mut w, &idle()).result, FrameResult::Win(bonus));
        assert_eq!(w.score(), bonus);
    }

    // ── Time ──

    #[test]
    fn running_out_of_frames_loses_without_bonus() {
        let mut w = arena();
        w.config.max_frames = 30;
        w.score.add(90);
        let events = run(&mut w, idle(), 30);
        assert_eq!(w.outcome, Some(FrameResult::Lose(90)));
        assert!(events.contains(&GameEvent::TimeUp));
        assert!(!w.score.bonus_applied());
    }

    // ── Hazards ──

    #[test]
    fn barrel_contact_without_hammer_loses() {
        let mut w = arena();
        let cfg = w.config.clone();
        let mut b = Barrel::new(0, 120.0, FLOOR_TOP - 16.0, cfg.sizes.barrel, 0.0);
        b.motion.grounded = true;
        w.barrels.push(b);
        assert_eq!(step(&mut w, &idle()).result, FrameResult::Lose(0));
    }

    #[test]
    fn hammer_smashes_barrels_and_monkeys() {
        let mut w = arena();
        let cfg = w.config.clone();
        w.player.collect_hammer();
        let mut b = Barrel::new(7, 120.0, FLOOR_TOP - 16.0, cfg.sizes.barrel, 0.0);
        b.motion.grounded = true;
        w.barrels.push(b);
        let mut m = Monkey::new(MonkeyKind::Normal, 80.0, FLOOR_TOP - 16.0, cfg.sizes.monkey, Facing::Left, vec![]);
        m.motion.grounded = true;
        w.monkeys.push(m);

        let report = step(&mut w, &idle());
        assert_eq!(report.result, FrameResult::Continue);
        assert!(report.events.contains(&GameEvent::BarrelSmashed { id: 7 }));
        assert!(report.events.contains(&GameEvent::MonkeyDestroyed));
        assert_eq!(w.score(), 200);
        assert!(w.barrels.is_empty());
        assert!(w.monkeys.is_empty());
    }

    #[test]
    fn banana_kills_even_with_hammer() {
        let mut w = arena();
        w.player.collect_hammer();
        let cfg = w.config.clone();
        w.projectiles.push(Projectile::new(
            ProjectileKind::Banana, 110.0, w.player.body.y, cfg.sizes.banana, Facing::Left, 1.8,
        ));
        assert_eq!(step(&mut w, &idle()).result, FrameResult::Lose(0));
    }

    #[test]
    fn bullet_destroys_monkey_for_points() {
        let mut w = arena();
        let cfg = w.config.clone();
        w.player.collect_blaster(1);
        let mut m = Monkey::new(
            MonkeyKind::Normal, 200.0, FLOOR_TOP - 16.0, cfg.sizes.monkey, Facing::Right, vec![1000.0],
        );
        m.motion.grounded = true;
        w.monkeys.push(m);

        let fire = FrameInput { fire: true, ..FrameInput::default() };
        let mut events = step(&mut w, &fire).events;
        assert_eq!(w.player.weapon, Weapon::None);
        events.extend(run(&mut w, idle(), 40));

        assert!(events.contains(&GameEvent::BulletFired));
        assert!(events.contains(&GameEvent::MonkeyDestroyed));
        assert!(w.monkeys.is_empty());
        assert!(w.projectiles.is_empty());
        assert_eq!(w.score(), 100);
    }

    #[test]
    fn intelligent_monkey_throws_on_schedule() {
        let mut w = arena();
        let cfg = w.config.clone();
        let mut m = Monkey::new(
            MonkeyKind::Intelligent { banana_cooldown: cfg.tuning.banana_interval_frames },
            600.0, FLOOR_TOP - 16.0, cfg.sizes.monkey, Facing::Left, vec![20.0],
        );
        m.motion.grounded = true;
        w.monkeys.push(m);

        let events = run(&mut w, idle(), 299);
        assert!(!events.contains(&GameEvent::BananaThrown));
        let events = run(&mut w, idle(), 1);
        assert_eq!(events, vec![GameEvent::BananaThrown]);
        assert_eq!(w.projectiles.len(), 1);
    }

    // ── Pickups ──

    #[test]
    fn walking_over_pickups_arms_the_player() {
        let mut w = arena();
        let cfg = w.config.clone();
        w.pickups.push(Pickup::new(PickupKind::Blaster, 130.0, FLOOR_TOP - 8.0, cfg.sizes.blaster));
        w.pickups.push(Pickup::new(PickupKind::Hammer, 200.0, FLOOR_TOP - 12.0, cfg.sizes.hammer));

        let events = run(&mut w, right(), 5);
        assert_eq!(events, vec![GameEvent::BlasterCollected]);
        assert_eq!(w.player.bullets(), 5);

        let events = run(&mut w, right(), 20);
        assert_eq!(events, vec![GameEvent::HammerCollected]);
        assert!(w.player.has_hammer());
        assert!(w.pickups.is_empty());
    }

    // ── Ladders ──

    #[test]
    fn falling_ladder_pins_on_landing() {
        let mut w = arena();
        let cfg = w.config.clone();
        w.ladders.push(Ladder::new(500.0, FLOOR_TOP - 60.0 - 10.0, cfg.sizes.ladder));
        run(&mut w, idle(), 60);
        let l = &w.ladders[0];
        assert!(l.pinned);
        assert_eq!(l.body.bottom(), FLOOR_TOP);

        run(&mut w, idle(), 30);
        assert_eq!(w.ladders[0].body.bottom(), FLOOR_TOP);
    }

    #[test]
    fn climb_to_upper_floor() {
        let mut w = arena();
        let cfg = w.config.clone();
        let upper = FLOOR_TOP - 120.0;
        w.platforms.push(Platform::new(100.0, upper + 8.0, Size::new(256.0, 16.0)));
        let mut l = Ladder::new(150.0, FLOOR_TOP - 60.0, cfg.sizes.ladder);
        l.pinned = true;
        w.ladders.push(l);
        w.player.body.x = 150.0;

        let up = FrameInput { up: true, ..FrameInput::default() };
        step(&mut w, &up);
        assert!(w.player.is_climbing());

        run(&mut w, up, 100);
        assert!(!w.player.is_climbing());
        assert!(w.player.motion.grounded);
        assert!((w.player.body.bottom() - upper).abs() <= cfg.tuning.landing_tolerance);
    }
}
