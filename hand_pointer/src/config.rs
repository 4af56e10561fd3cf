//! Application configuration, read once from the environment (and `.env`).
//!
//! `hand_pointer --config pipeline.json` starts from a JSON pipeline file
//! (the format `--print-config` writes) instead of the built-in defaults;
//! this is the only way to change `open_closed_landmark_pairs`.  Variables
//! that are set still override the file.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HAND_SMOOTHING_POINTER` | 0.25 | pointer smoothing coefficient |
//! | `HAND_SMOOTHING_VOLUME` | 0.20 | volume smoothing coefficient |
//! | `HAND_ROI_MARGIN` | 0.15 | ignored frame border per side |
//! | `HAND_PINCH_THRESHOLD_PX` | 35 | pinch starts below this |
//! | `HAND_PINCH_RELEASE_PX` | 35 | pinch ends at or above this |
//! | `HAND_CLICK_COOLDOWN_S` | 0.45 | minimum time between clicks |
//! | `HAND_VOLUME_RATE_LIMIT_S` | 0.12 | minimum time between volume requests |
//! | `HAND_VOLUME_DEAD_BAND` | 2 | minimum percent change worth sending |
//! | `HAND_VOLUME_DISTANCE_MIN` / `_MAX` | 0.02 / 0.18 | spread mapped to 0 / 100 % |
//! | `HAND_VOLUME_REQUIRES_MODE` | true | volume only while the open-hand mode is on |
//! | `HAND_THUMB_EPSILON` | 0.01 | thumb polarity dead zone |
//! | `HAND_FRAME_WIDTH` / `_HEIGHT` | 640 / 480 | camera frame size |
//! | `HAND_SCREEN_WIDTH` / `_HEIGHT` | 1920 / 1080 | target screen size |
//! | `VOLUME_BACKEND` | midi | `midi`, `osascript` or `log` |
//! | `MIDI_CHANNEL` | 1 | 1–16, for the `midi` backend |
//! | `POINTER_BACKEND` | sim | `sim` or `desktop` |
//! | `RECORD_TRACE` | unset | write a landmark trace to this path |
//! | `LOG_LEVEL` | info | log filter (`RUST_LOG` overrides it) |
//! | `ENABLE_FILE_LOGS` / `LOG_DIR` | false / ./logs | daily JSON log files |

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use hand_actuate::{PointerBackend, UnknownBackend, VolumeBackend};
use hand_signal::PipelineConfig;

use crate::logging::LogConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub volume:   VolumeBackend,
    pub pointer:  PointerBackend,
    /// Where to record the landmark trace, if anywhere.
    pub record:   Option<PathBuf>,
    pub log:      LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            pipeline: PipelineConfig::default(),
            volume:   VolumeBackend::Midi { channel: 0 },
            pointer:  PointerBackend::Sim,
            record:   None,
            log:      LogConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Json {
        path:   String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a pipeline configuration written as JSON.  Missing fields take
/// their defaults.
pub fn load_pipeline(path: &Path) -> Result<PipelineConfig, ConfigFileError> {
    let shown = path.display().to_string();
    let file = File::open(path).map_err(|source| ConfigFileError::Io { path: shown.clone(), source })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ConfigFileError::Json { path: shown, source })
}

impl AppConfig {
    /// Environment over the built-in pipeline defaults.
    pub fn from_env() -> Result<Self, UnknownBackend> {
        Self::from_env_over(PipelineConfig::default())
    }

    /// Environment over `base`.  Unparsable numbers fall back to the base
    /// value with a warning; an unknown backend name is an error.
    pub fn from_env_over(base: PipelineConfig) -> Result<Self, UnknownBackend> {
        let d = base;
        let pipeline = PipelineConfig {
            smoothing_alpha_pointer: env_or_parse("HAND_SMOOTHING_POINTER", d.smoothing_alpha_pointer),
            smoothing_alpha_volume:  env_or_parse("HAND_SMOOTHING_VOLUME", d.smoothing_alpha_volume),
            roi_margin:              env_or_parse("HAND_ROI_MARGIN", d.roi_margin),
            pinch_threshold_px:      env_or_parse("HAND_PINCH_THRESHOLD_PX", d.pinch_threshold_px),
            pinch_release_px:        env_or_parse("HAND_PINCH_RELEASE_PX", d.pinch_release_px),
            click_cooldown_s:        env_or_parse("HAND_CLICK_COOLDOWN_S", d.click_cooldown_s),
            volume_rate_limit_s:     env_or_parse("HAND_VOLUME_RATE_LIMIT_S", d.volume_rate_limit_s),
            volume_dead_band:        env_or_parse("HAND_VOLUME_DEAD_BAND", d.volume_dead_band),
            volume_distance_min:     env_or_parse("HAND_VOLUME_DISTANCE_MIN", d.volume_distance_min),
            volume_distance_max:     env_or_parse("HAND_VOLUME_DISTANCE_MAX", d.volume_distance_max),
            volume_requires_mode:    env_or_bool("HAND_VOLUME_REQUIRES_MODE", d.volume_requires_mode),
            thumb_polarity_epsilon:  env_or_parse("HAND_THUMB_EPSILON", d.thumb_polarity_epsilon),
            frame_width:             env_or_parse("HAND_FRAME_WIDTH", d.frame_width),
            frame_height:            env_or_parse("HAND_FRAME_HEIGHT", d.frame_height),
            screen_width:            env_or_parse("HAND_SCREEN_WIDTH", d.screen_width),
            screen_height:           env_or_parse("HAND_SCREEN_HEIGHT", d.screen_height),
            ..d
        };

        let volume = match VolumeBackend::from_str(&env_or("VOLUME_BACKEND", "midi"))? {
            VolumeBackend::Midi { .. } => {
                let channel = env_or_parse("MIDI_CHANNEL", 1_u8).clamp(1, 16) - 1;
                VolumeBackend::Midi { channel }
            }
            other => other,
        };
        let pointer = PointerBackend::from_str(&env_or("POINTER_BACKEND", "sim"))?;

        let record = env::var("RECORD_TRACE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(AppConfig {
            pipeline,
            volume,
            pointer,
            record,
            log: LogConfig {
                log_level:        env_or("LOG_LEVEL", "info"),
                enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
                log_dir:          env_or("LOG_DIR", "./logs"),
            },
        })
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
