/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (every `.toml` file, sorted by file name)
///   2. Built-in embedded levels
///
/// ## Level format (`.toml`):
///   ```toml
///   name = "Level 1 - Construction Site"
///   boss_health = 1
///   ladder_gravity = 0.25          # optional, clamped to the configured range
///   player = "100,700"
///   donkey_kong = "300,100"
///   platforms = ["64,760", ...]
///   ladders = ["760,682", ...]
///   barrels = ["520,712", ...]
///   hammers = ["600,380"]
///   blasters = ["900,744"]
///   monkeys = ["500,488;right;120,120"]
///   intelligent_monkeys = ["650,248;left;100,100"]
///   ```
///
/// Every position is an entity center. A malformed entry is skipped with a
/// `LevelDiagnostic`; a malformed or missing player / boss position falls
/// back to a default and is reported the same way.
///
/// After all entries are read, anything overlapping a platform (ladders
/// excepted) is lifted onto that platform's top.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::SimConfig;
use crate::domain::collision::settle_on_platforms;
use crate::domain::entity::{
    Barrel, Body, DonkeyKong, Facing, Ladder, Monkey, MonkeyKind, Pickup, PickupKind, Platform,
    Player,
};
use crate::error::{LevelDiagnostic, LevelError, TupleError};
use crate::sim::world::WorldState;

const DEFAULT_PLAYER: (f64, f64) = (100.0, 700.0);
const DEFAULT_BOSS: (f64, f64) = (300.0, 100.0);

/// Parsed level file. Entity tuples are still raw strings here.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LevelDef {
    pub name: String,
    pub boss_health: Option<u32>,
    pub ladder_gravity: Option<f64>,
    pub player: Option<String>,
    pub donkey_kong: Option<String>,
    pub platforms: Vec<String>,
    pub ladders: Vec<String>,
    pub barrels: Vec<String>,
    pub hammers: Vec<String>,
    pub blasters: Vec<String>,
    pub monkeys: Vec<String>,
    pub intelligent_monkeys: Vec<String>,
}

impl LevelDef {
    pub fn parse(text: &str, origin: &Path) -> Result<LevelDef, LevelError> {
        let mut def: LevelDef = toml::from_str(text).map_err(|e| LevelError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if def.name.trim().is_empty() {
            def.name = origin
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unnamed".to_string());
        }
        Ok(def)
    }
}

// ══════════════════════════════════════════════════════════════
// Tuple parsing
// ══════════════════════════════════════════════════════════════

fn number(s: &str) -> Result<f64, TupleError> {
    let t = s.trim();
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TupleError::NotNumeric(t.to_string()))
}

/// `"x,y"` → `(x, y)`.
pub fn parse_point(s: &str) -> Result<(f64, f64), TupleError> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(TupleError::Arity { expected: 2, found: parts.len() });
    }
    Ok((number(parts[0])?, number(parts[1])?))
}

fn parse_facing(s: &str) -> Result<Facing, TupleError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(Facing::Left),
        "right" | "r" => Ok(Facing::Right),
        other => Err(TupleError::BadFacing(other.to_string())),
    }
}

/// Monkey entry: `"x,y;facing;d1,d2,..."`. The distance list may be empty.
pub struct MonkeyEntry {
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    pub patrol: Vec<f64>,
}

pub fn parse_monkey(s: &str) -> Result<MonkeyEntry, TupleError> {
    let parts: Vec<&str> = s.split(';').collect();
    if parts.len() != 3 {
        return Err(TupleError::Arity { expected: 3, found: parts.len() });
    }
    let (x, y) = parse_point(parts[0])?;
    let facing = parse_facing(parts[1])?;
    let patrol = if parts[2].trim().is_empty() {
        Vec::new()
    } else {
        parts[2].split(',').map(number).collect::<Result<Vec<_>, _>>()?
    };
    Ok(MonkeyEntry { x, y, facing, patrol })
}

// ══════════════════════════════════════════════════════════════
// World construction
// ══════════════════════════════════════════════════════════════

struct Loader {
    diagnostics: Vec<LevelDiagnostic>,
}

impl Loader {
    /// Parse every entry of one list, skipping the broken ones.
    fn each<T>(
        &mut self,
        entity: &'static str,
        raw: &[String],
        parse: impl Fn(&str) -> Result<T, TupleError>,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(raw.len());
        for (index, s) in raw.iter().enumerate() {
            match parse(s) {
                Ok(v) => out.push(v),
                Err(error) => self.diagnostics.push(LevelDiagnostic {
                    entity,
                    index,
                    raw: s.clone(),
                    error,
                }),
            }
        }
        out
    }

    fn point_or(&mut self, entity: &'static str, raw: Option<&String>, fallback: (f64, f64)) -> (f64, f64) {
        let text = raw.map(String::as_str).unwrap_or("");
        let result = match raw {
            Some(s) => parse_point(s),
            None => Err(TupleError::Arity { expected: 2, found: 0 }),
        };
        result.unwrap_or_else(|error| {
            self.diagnostics.push(LevelDiagnostic { entity, index: 0, raw: text.to_string(), error });
            fallback
        })
    }
}

/// Build the world for one level. Diagnostics are returned and also logged.
pub fn build_world(
    def: &LevelDef,
    level_index: usize,
    is_final_level: bool,
    sim: &SimConfig,
    base_score: u32,
) -> (WorldState, Vec<LevelDiagnostic>) {
    let sizes = &sim.sizes;
    let mut world = WorldState::new(sim.clone(), level_index, is_final_level, base_score);
    world.name = def.name.clone();
    world.ladder_physics = sim.ladder_physics(def.ladder_gravity);

    let mut ld = Loader { diagnostics: Vec::new() };

    world.platforms = ld
        .each("platforms", &def.platforms, parse_point)
        .into_iter()
        .map(|(x, y)| Platform::new(x, y, sizes.platform))
        .collect();

    let (px, py) = ld.point_or("player", def.player.as_ref(), DEFAULT_PLAYER);
    world.player = Player::new(px, py, sizes.player);

    let (bx, by) = ld.point_or("donkey_kong", def.donkey_kong.as_ref(), DEFAULT_BOSS);
    world.boss = DonkeyKong::new(bx, by, sizes.boss, def.boss_health.unwrap_or(1).max(1));

    world.ladders = ld
        .each("ladders", &def.ladders, parse_point)
        .into_iter()
        .map(|(x, y)| Ladder::new(x, y, sizes.ladder))
        .collect();

    world.barrels = ld
        .each("barrels", &def.barrels, parse_point)
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| Barrel::new(i as u32, x, y, sizes.barrel, sim.physics.barrel_initial_vy))
        .collect();

    let hammers = ld.each("hammers", &def.hammers, parse_point);
    let blasters = ld.each("blasters", &def.blasters, parse_point);
    world.pickups = hammers
        .into_iter()
        .map(|(x, y)| Pickup::new(PickupKind::Hammer, x, y, sizes.hammer))
        .chain(blasters.into_iter().map(|(x, y)| Pickup::new(PickupKind::Blaster, x, y, sizes.blaster)))
        .collect();

    let normal = ld.each("monkeys", &def.monkeys, parse_monkey);
    let smart = ld.each("intelligent_monkeys", &def.intelligent_monkeys, parse_monkey);
    let interval = sim.tuning.banana_interval_frames;
    world.monkeys = normal
        .into_iter()
        .map(|m| (MonkeyKind::Normal, m))
        .chain(smart.into_iter().map(|m| (MonkeyKind::Intelligent { banana_cooldown: interval }, m)))
        .map(|(kind, m)| Monkey::new(kind, m.x, m.y, sizes.monkey, m.facing, m.patrol))
        .collect();

    settle(&mut world);

    for d in &ld.diagnostics {
        log::warn!("{}: skipped {}", def.name, d);
    }
    log::info!(
        "built {} with {} platforms, {} ladders, {} barrels, {} monkeys, {} pickups",
        def.name,
        world.platforms.len(),
        world.ladders.len(),
        world.barrels.len(),
        world.monkeys.len(),
        world.pickups.len(),
    );
    (world, ld.diagnostics)
}

/// Lift anything overlapping a platform onto its top. Ladders are left to
/// fall and pin themselves.
fn settle(world: &mut WorldState) {
    let platforms = &world.platforms;
    let mut lifted = 0;
    let mut lift = |body: &mut Body| {
        if settle_on_platforms(body, platforms) {
            lifted += 1;
        }
    };

    lift(&mut world.player.body);
    lift(&mut world.boss.body);
    world.barrels.iter_mut().for_each(|b| lift(&mut b.body));
    world.monkeys.iter_mut().for_each(|m| lift(&mut m.body));
    world.pickups.iter_mut().for_each(|p| lift(&mut p.body));

    if lifted > 0 {
        log::debug!("lifted {lifted} entities out of platforms");
    }
    // Keep the penetration check honest on the first frame.
    world.player.motion.prev_y = world.player.body.y;
    world.boss.motion.prev_y = world.boss.body.y;
    for b in &mut world.barrels {
        b.motion.prev_y = b.body.y;
    }
    for m in &mut world.monkeys {
        m.motion.prev_y = m.body.y;
    }
}

// ══════════════════════════════════════════════════════════════
// Campaign
// ══════════════════════════════════════════════════════════════

/// The ordered list of levels for one play-through.
pub struct Campaign {
    levels: Vec<LevelDef>,
}

impl Campaign {
    /// Load from `dir`, or fall back to the built-in levels.
    pub fn load(dir: &Path) -> Campaign {
        match load_from_directory(dir) {
            Ok(levels) => {
                log::info!("loaded {} levels from {}", levels.len(), dir.display());
                Campaign { levels }
            }
            Err(e) => {
                log::warn!("{e}; using built-in levels");
                Campaign::builtin()
            }
        }
    }

    pub fn builtin() -> Campaign {
        let levels = embedded_levels()
            .into_iter()
            .filter_map(|(origin, text)| match LevelDef::parse(text, Path::new(origin)) {
                Ok(def) => Some(def),
                Err(e) => {
                    log::warn!("built-in level: {e}");
                    None
                }
            })
            .collect();
        Campaign { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.levels.get(index).map(|l| l.name.as_str())
    }

    #[cfg(test)]
    pub fn from_levels(levels: Vec<LevelDef>) -> Campaign {
        Campaign { levels }
    }

    /// Build level `index` along with the entries that had to be skipped.
    /// The last level of the campaign is the final one.
    pub fn build(
        &self,
        index: usize,
        sim: &SimConfig,
        base_score: u32,
    ) -> Option<(WorldState, Vec<LevelDiagnostic>)> {
        let def = self.levels.get(index)?;
        let is_final = index + 1 == self.levels.len();
        Some(build_world(def, index, is_final, sim, base_score))
    }
}

fn load_from_directory(dir: &Path) -> Result<Vec<LevelDef>, LevelError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LevelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "toml"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(LevelError::Empty { dir: dir.to_path_buf() });
    }

    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
                path: path.clone(),
                source,
            })?;
            LevelDef::parse(&text, path)
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<(&'static str, &'static str)> {
    vec![
        ("level1.toml", include_str!("../../levels/level1.toml")),
        ("level2.toml", include_str!("../../levels/level2.toml")),
    ]
}
