/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems found while loading are kept in `GameConfig::warnings` and
/// logged once the logger is up.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::domain::ai::PatrolRules;
use crate::domain::climbing::ClimbRules;
use crate::domain::geometry::{Rect, Size};
use crate::domain::jump::JumpRules;
use crate::domain::physics::PhysicsParams;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub log: LogConfig,
    pub tick_rate_ms: u64,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: LevelFilter,
}

/// Everything the simulation reads. No I/O, no clocks.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub window_width: f64,
    pub window_height: f64,
    pub fps: u32,
    /// Frame budget per level; running out is a loss.
    pub max_frames: u32,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub sizes: SizeConfig,
    pub tuning: TuningConfig,
    pub scoring: ScoringConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub player: PhysicsParams,
    pub barrel: PhysicsParams,
    pub boss: PhysicsParams,
    pub ladder: PhysicsParams,
    pub monkey: PhysicsParams,
    pub barrel_initial_vy: f64,
    /// Per-level ladder gravity is clamped into this range.
    pub ladder_gravity_range: (f64, f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    pub move_speed: f64,
    pub climb_speed: f64,
    pub jump_velocity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SizeConfig {
    pub platform: Size,
    pub player: Size,
    pub barrel: Size,
    pub ladder: Size,
    pub boss: Size,
    pub monkey: Size,
    pub hammer: Size,
    pub blaster: Size,
    pub bullet: Size,
    pub banana: Size,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TuningConfig {
    pub landing_tolerance: f64,
    pub ladder_edge_margin: f64,
    pub ladder_top_window: f64,
    pub ladder_bottom_window: f64,
    pub ladder_placement_offset: f64,
    pub jump_horizontal_margin: f64,
    pub jump_side_deadzone: f64,
    pub jump_max_vertical: f64,
    pub jump_reset_distance: f64,
    pub jump_repeat_distance: f64,
    pub jump_cooldown_frames: u32,
    pub jump_global_cooldown_frames: u32,
    pub monkey_speed: f64,
    pub banana_interval_frames: u32,
    pub projectile_range: f64,
    pub bullet_speed: f64,
    pub banana_speed: f64,
    pub blaster_bullets: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub barrel_jump: u32,
    pub barrel_smash: u32,
    pub monkey: u32,
    pub time_bonus_per_second: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

impl SimConfig {
    /// Play field in world pixels.
    pub fn field(&self) -> Rect {
        Rect { left: 0.0, top: 0.0, right: self.window_width, bottom: self.window_height }
    }

    pub fn climb_rules(&self) -> ClimbRules {
        ClimbRules {
            climb_speed: self.player.climb_speed,
            edge_margin: self.tuning.ladder_edge_margin,
            top_window: self.tuning.ladder_top_window,
            bottom_window: self.tuning.ladder_bottom_window,
            placement_offset: self.tuning.ladder_placement_offset,
        }
    }

    pub fn jump_rules(&self) -> JumpRules {
        let t = &self.tuning;
        JumpRules {
            horizontal_margin: t.jump_horizontal_margin,
            side_deadzone: t.jump_side_deadzone,
            max_vertical: t.jump_max_vertical,
            reset_distance: t.jump_reset_distance,
            repeat_distance: t.jump_repeat_distance,
            cooldown_frames: t.jump_cooldown_frames,
            global_cooldown_frames: t.jump_global_cooldown_frames,
        }
    }

    pub fn patrol_rules(&self) -> PatrolRules {
        PatrolRules {
            speed: self.tuning.monkey_speed,
            physics: self.physics.monkey,
            tolerance: self.tuning.landing_tolerance,
        }
    }

    /// Ladder physics for one level, with its gravity clamped into range.
    pub fn ladder_physics(&self, level_gravity: Option<f64>) -> PhysicsParams {
        let (lo, hi) = self.physics.ladder_gravity_range;
        let gravity = level_gravity.unwrap_or(self.physics.ladder.gravity).clamp(lo, hi);
        PhysicsParams::new(gravity, self.physics.ladder.terminal_velocity)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    window: TomlWindow,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    sizes: TomlSizes,
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlWindow {
    width: f64,
    height: f64,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlTiming {
    fps: u32,
    max_frames: u32,
    tick_rate_ms: u64,
}

/// Physics pairs are written `[gravity, terminal_velocity]`.
#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlPhysics {
    player: [f64; 2],
    barrel: [f64; 2],
    boss: [f64; 2],
    ladder: [f64; 2],
    monkey: [f64; 2],
    barrel_initial_vy: f64,
    ladder_gravity_range: [f64; 2],
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlPlayer {
    move_speed: f64,
    climb_speed: f64,
    jump_velocity: f64,
}

/// Sizes are written `[width, height]`.
#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlSizes {
    platform: [f64; 2],
    player: [f64; 2],
    barrel: [f64; 2],
    ladder: [f64; 2],
    boss: [f64; 2],
    monkey: [f64; 2],
    hammer: [f64; 2],
    blaster: [f64; 2],
    bullet: [f64; 2],
    banana: [f64; 2],
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlTuning {
    landing_tolerance: f64,
    ladder_edge_margin: f64,
    ladder_top_window: f64,
    ladder_bottom_window: f64,
    ladder_placement_offset: f64,
    jump_horizontal_margin: f64,
    jump_side_deadzone: f64,
    jump_max_vertical: f64,
    jump_reset_distance: f64,
    jump_repeat_distance: f64,
    jump_cooldown_frames: u32,
    jump_global_cooldown_frames: u32,
    monkey_speed: f64,
    banana_interval_frames: u32,
    projectile_range: f64,
    bullet_speed: f64,
    banana_speed: f64,
    blaster_bullets: u32,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlScoring {
    barrel_jump: u32,
    barrel_smash: u32,
    monkey: u32,
    time_bonus_per_second: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_fire")]
    fire: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_fire() -> Vec<String> { vec!["X".into(), "B".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }
fn default_levels_dir() -> String { "levels".into() }
fn default_log_file() -> String { "kong-climber.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlWindow {
    fn default() -> Self {
        TomlWindow { width: 1024.0, height: 768.0 }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        // 10800 frames = 3 minutes at 60 fps
        TomlTiming { fps: 60, max_frames: 10800, tick_rate_ms: 16 }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            player: [0.2, 10.0],
            barrel: [0.2, 5.0],
            boss: [0.4, 5.0],
            ladder: [0.25, 5.0],
            monkey: [0.4, 5.0],
            barrel_initial_vy: 0.4,
            ladder_gravity_range: [0.2, 0.25],
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { move_speed: 3.5, climb_speed: 2.0, jump_velocity: -5.0 }
    }
}

impl Default for TomlSizes {
    fn default() -> Self {
        TomlSizes {
            platform: [128.0, 16.0],
            player: [30.0, 40.0],
            barrel: [32.0, 32.0],
            ladder: [40.0, 120.0],
            boss: [80.0, 64.0],
            monkey: [32.0, 32.0],
            hammer: [24.0, 24.0],
            blaster: [24.0, 16.0],
            bullet: [12.0, 4.0],
            banana: [14.0, 10.0],
        }
    }
}

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            landing_tolerance: 5.0,
            ladder_edge_margin: 5.0,
            ladder_top_window: 10.0,
            ladder_bottom_window: 5.0,
            ladder_placement_offset: 1.0,
            jump_horizontal_margin: 5.0,
            jump_side_deadzone: 5.0,
            jump_max_vertical: 80.0,
            jump_reset_distance: 20.0,
            jump_repeat_distance: 10.0,
            jump_cooldown_frames: 30,
            jump_global_cooldown_frames: 45,
            monkey_speed: 0.5,
            banana_interval_frames: 300,
            projectile_range: 300.0,
            bullet_speed: 3.8,
            banana_speed: 1.8,
            blaster_bullets: 5,
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring { barrel_jump: 30, barrel_smash: 100, monkey: 100, time_bonus_per_second: 3 }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            fire: default_fire(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        sim_from_toml(&TomlConfig::default(), &mut Vec::new())
    }
}

// ── Conversion ──

fn pair(p: [f64; 2]) -> PhysicsParams {
    PhysicsParams::new(p[0], p[1])
}

fn size(s: [f64; 2]) -> Size {
    Size::new(s[0], s[1])
}

fn sim_from_toml(t: &TomlConfig, warnings: &mut Vec<String>) -> SimConfig {
    let mut fps = t.timing.fps;
    if fps == 0 {
        warnings.push("timing.fps must be positive; using 60".into());
        fps = 60;
    }
    let mut range = t.physics.ladder_gravity_range;
    if range[0] > range[1] {
        warnings.push(format!("physics.ladder_gravity_range {:?} is reversed", range));
        range.swap(0, 1);
    }

    SimConfig {
        window_width: t.window.width,
        window_height: t.window.height,
        fps,
        max_frames: t.timing.max_frames,
        physics: PhysicsConfig {
            player: pair(t.physics.player),
            barrel: pair(t.physics.barrel),
            boss: pair(t.physics.boss),
            ladder: pair(t.physics.ladder),
            monkey: pair(t.physics.monkey),
            barrel_initial_vy: t.physics.barrel_initial_vy,
            ladder_gravity_range: (range[0], range[1]),
        },
        player: PlayerConfig {
            move_speed: t.player.move_speed,
            climb_speed: t.player.climb_speed,
            jump_velocity: t.player.jump_velocity,
        },
        sizes: SizeConfig {
            platform: size(t.sizes.platform),
            player: size(t.sizes.player),
            barrel: size(t.sizes.barrel),
            ladder: size(t.sizes.ladder),
            boss: size(t.sizes.boss),
            monkey: size(t.sizes.monkey),
            hammer: size(t.sizes.hammer),
            blaster: size(t.sizes.blaster),
            bullet: size(t.sizes.bullet),
            banana: size(t.sizes.banana),
        },
        tuning: TuningConfig {
            landing_tolerance: t.tuning.landing_tolerance,
            ladder_edge_margin: t.tuning.ladder_edge_margin,
            ladder_top_window: t.tuning.ladder_top_window,
            ladder_bottom_window: t.tuning.ladder_bottom_window,
            ladder_placement_offset: t.tuning.ladder_placement_offset,
            jump_horizontal_margin: t.tuning.jump_horizontal_margin,
            jump_side_deadzone: t.tuning.jump_side_deadzone,
            jump_max_vertical: t.tuning.jump_max_vertical,
            jump_reset_distance: t.tuning.jump_reset_distance,
            jump_repeat_distance: t.tuning.jump_repeat_distance,
            jump_cooldown_frames: t.tuning.jump_cooldown_frames,
            jump_global_cooldown_frames: t.tuning.jump_global_cooldown_frames,
            monkey_speed: t.tuning.monkey_speed,
            banana_interval_frames: t.tuning.banana_interval_frames.max(1),
            projectile_range: t.tuning.projectile_range,
            bullet_speed: t.tuning.bullet_speed,
            banana_speed: t.tuning.banana_speed,
            blaster_bullets: t.tuning.blaster_bullets,
        },
        scoring: ScoringConfig {
            barrel_jump: t.scoring.barrel_jump,
            barrel_smash: t.scoring.barrel_smash,
            monkey: t.scoring.monkey,
            time_bonus_per_second: t.scoring.time_bonus_per_second,
        },
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();

        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::from_toml(toml_cfg, &search_dirs, warnings)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let sim = sim_from_toml(&toml_cfg, &mut warnings);

        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let level = LevelFilter::from_str(&toml_cfg.general.log_level).unwrap_or_else(|_| {
            warnings.push(format!("unknown log_level {:?}; using info", toml_cfg.general.log_level));
            LevelFilter::Info
        });

        GameConfig {
            sim,
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                fire: toml_cfg.gamepad.fire,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                pause: toml_cfg.gamepad.pause,
            },
            levels_dir,
            log: LogConfig { file: PathBuf::from(&toml_cfg.general.log_file), level },
            tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
            warnings,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/kong-climber)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/kong-climber");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/kong-climber");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}
