/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Every key is optional; a missing file means all defaults. A file that
/// exists but cannot be read, parsed or validated is reported as a
/// `ConfigError` and the caller decides whether to fall back.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::domain::tile::{self, Value};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("win_target must be a power of two of at least 4, got {0}")]
    InvalidTarget(Value),
    #[error("unknown log level {0:?}")]
    InvalidLevel(String),
}

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub game: GameSettings,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameSettings {
    pub win_target: Value,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub slide_ticks: u32,  // frames a tile takes to reach its destination
    pub pop_ticks: u32,    // frames of the grow/shrink on merged and new tiles
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub keep_playing: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub file: Option<PathBuf>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_win_target")]
    win_target: Value,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_slide_ticks")]
    slide_ticks: u32,
    #[serde(default = "default_pop_ticks")]
    pop_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_keep_playing")]
    keep_playing: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default)]
    file: Option<PathBuf>,
}

// ── Defaults ──

fn default_win_target() -> Value { 2048 }
fn default_tick_rate() -> u64 { 16 }    // ~60 fps
fn default_slide_ticks() -> u32 { 6 }
fn default_pop_ticks() -> u32 { 4 }

fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_keep_playing() -> Vec<String> { vec!["A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            win_target: default_win_target(),
            seed: None,
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            slide_ticks: default_slide_ticks(),
            pop_ticks: default_pop_ticks(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            keep_playing: default_keep_playing(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            game: GameSettings {
                win_target: default_win_target(),
                seed: None,
            },
            speed: SpeedConfig {
                tick_rate_ms: default_tick_rate(),
                slide_ticks: default_slide_ticks(),
                pop_ticks: default_pop_ticks(),
            },
            gamepad: GamepadConfig {
                restart: default_restart(),
                keep_playing: default_keep_playing(),
                quit: default_quit(),
            },
            log: LogConfig {
                level: LevelFilter::Info,
                file: None,
            },
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// The first file found wins; no file at all yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        for dir in candidate_dirs() {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
                return Self::from_toml_str(&text, &path);
            }
        }
        Ok(Self::default())
    }

    /// Parse and validate config text. `origin` is only used in errors.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let schema: TomlConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::from_schema(schema)
    }

    fn from_schema(cfg: TomlConfig) -> Result<Self, ConfigError> {
        let target = cfg.game.win_target;
        if target < 4 || !tile::is_tile_value(target) {
            return Err(ConfigError::InvalidTarget(target));
        }
        let level = cfg
            .log
            .level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLevel(cfg.log.level.clone()))?;

        Ok(GameConfig {
            game: GameSettings {
                win_target: target,
                seed: cfg.game.seed,
            },
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(1),
                slide_ticks: cfg.speed.slide_ticks,
                pop_ticks: cfg.speed.pop_ticks,
            },
            gamepad: GamepadConfig {
                restart: cfg.gamepad.restart,
                keep_playing: cfg.gamepad.keep_playing,
                quit: cfg.gamepad.quit,
            },
            log: LogConfig {
                level,
                file: cfg.log.file,
            },
        })
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks so an installed link still finds the real directory.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<GameConfig, ConfigError> {
        GameConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = parse("").expect("empty config");
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.game.win_target, 2048);
        assert_eq!(cfg.game.seed, None);
        assert_eq!(cfg.speed.slide_ticks, 6);
        assert_eq!(cfg.log.level, LevelFilter::Info);
        assert_eq!(cfg.log.file, None);
        assert_eq!(cfg.gamepad.restart, vec!["Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse(
            r#"
            [game]
            seed = 7

            [speed]
            pop_ticks = 0

            [log]
            level = "debug"
            file = "twenty48.log"
            "#,
        )
        .expect("valid config");
        assert_eq!(cfg.game.seed, Some(7));
        assert_eq!(cfg.game.win_target, 2048);
        assert_eq!(cfg.speed.pop_ticks, 0);
        assert_eq!(cfg.speed.slide_ticks, 6);
        assert_eq!(cfg.log.level, LevelFilter::Debug);
        assert_eq!(cfg.log.file, Some(PathBuf::from("twenty48.log")));
    }

    #[test]
    fn target_must_be_a_power_of_two() {
        assert!(matches!(parse("[game]\nwin_target = 1000"), Err(ConfigError::InvalidTarget(1000))));
        assert!(matches!(parse("[game]\nwin_target = 2"), Err(ConfigError::InvalidTarget(2))));
        assert_eq!(parse("[game]\nwin_target = 512").map(|c| c.game.win_target).ok(), Some(512));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = parse("[log]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLevel(ref l) if l == "loud"));
    }

    #[test]
    fn syntax_error_names_the_file() {
        let err = parse("[game\nseed = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("test.toml"));
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(matches!(parse("[graphics]\nfps = 60"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = parse("[speed]\ntick_rate_ms = 0").expect("valid config");
        assert_eq!(cfg.speed.tick_rate_ms, 1);
    }
}
