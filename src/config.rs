/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The simulation tick is fixed at 60 Hz and is deliberately not
/// configurable: the kinematic formulas bake the 1/60 step.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub screen: ScreenConfig,
    pub hero: HeroConfig,
    pub worlds_dir: PathBuf,
    pub assets_dir: PathBuf,
}

/// Motion constants, px/s and px/s² in world pixels.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsConfig {
    pub accel: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
}

/// Virtual viewport, world pixels.
#[derive(Clone, Copy, Debug)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

/// Hero bounding box, world pixels.
#[derive(Clone, Copy, Debug)]
pub struct HeroConfig {
    pub width: f32,
    pub height: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    hero: TomlHero,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_accel")]
    accel: f32,
    #[serde(default = "default_walk_speed")]
    walk_speed: f32,
    #[serde(default = "default_run_speed")]
    run_speed: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
}

#[derive(Deserialize, Debug)]
struct TomlScreen {
    #[serde(default = "default_screen_w")]
    width: u32,
    #[serde(default = "default_screen_h")]
    height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlHero {
    #[serde(default = "default_hero_w")]
    width: f32,
    #[serde(default = "default_hero_h")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_worlds_dir")]
    worlds_dir: String,
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
}

// ── Defaults ──

fn default_accel() -> f32 { 600.0 }
fn default_walk_speed() -> f32 { 150.0 }
fn default_run_speed() -> f32 { 300.0 }
fn default_jump_velocity() -> f32 { 400.0 }
fn default_gravity() -> f32 { 800.0 }

fn default_screen_w() -> u32 { 1200 }
fn default_screen_h() -> u32 { 750 }

fn default_hero_w() -> f32 { 50.0 }
fn default_hero_h() -> f32 { 25.0 }

fn default_worlds_dir() -> String { "worlds".into() }
fn default_assets_dir() -> String { "assets".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            accel: default_accel(),
            walk_speed: default_walk_speed(),
            run_speed: default_run_speed(),
            jump_velocity: default_jump_velocity(),
            gravity: default_gravity(),
        }
    }
}

impl Default for TomlScreen {
    fn default() -> Self {
        TomlScreen {
            width: default_screen_w(),
            height: default_screen_h(),
        }
    }
}

impl Default for TomlHero {
    fn default() -> Self {
        TomlHero {
            width: default_hero_w(),
            height: default_hero_h(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            worlds_dir: default_worlds_dir(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            physics: PhysicsConfig {
                accel: toml_cfg.physics.accel,
                walk_speed: toml_cfg.physics.walk_speed,
                run_speed: toml_cfg.physics.run_speed,
                jump_velocity: toml_cfg.physics.jump_velocity,
                gravity: toml_cfg.physics.gravity,
            },
            screen: ScreenConfig {
                width: toml_cfg.screen.width,
                height: toml_cfg.screen.height,
            },
            hero: HeroConfig {
                width: toml_cfg.hero.width,
                height: toml_cfg.hero.height,
            },
            worlds_dir: resolve_dir(&toml_cfg.general.worlds_dir, search_dirs),
            assets_dir: resolve_dir(&toml_cfg.general.assets_dir, search_dirs),
        }
    }
}

/// Resolve a possibly-relative directory against the search dirs,
/// preferring one that actually exists.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    if PathBuf::from(dir).is_absolute() {
        return PathBuf::from(dir);
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(dir))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (resolve symlinks)
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

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using defaults");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
