use std::path::{Path, PathBuf};

use kirinuki_core::game::{SNAP_THRESHOLD_DEFAULT, SNAP_THRESHOLD_MAX, SNAP_THRESHOLD_MIN};
use kirinuki_core::grid::{GridSize, DEFAULT_GRID_SIZE, MAX_DISPLAY_WIDTH_DEFAULT};
use kirinuki_core::shape::{TAB_RATIO_DEFAULT, TAB_RATIO_MAX, TAB_RATIO_MIN};
use kirinuki_core::{GridError, PlayMode, ShapeStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("{key} must be a finite number")]
    NonFinite { key: &'static str },
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

fn default_snap_threshold() -> f32 {
    SNAP_THRESHOLD_DEFAULT
}

fn default_tab_ratio() -> f32 {
    TAB_RATIO_DEFAULT
}

fn default_max_display_width() -> u32 {
    MAX_DISPLAY_WIDTH_DEFAULT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default)]
    pub mode: PlayMode,
    #[serde(default)]
    pub shape: ShapeStyle,
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold_px: f32,
    #[serde(default = "default_tab_ratio")]
    pub tab_ratio: f32,
    #[serde(default = "default_max_display_width")]
    pub max_display_width: u32,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            mode: PlayMode::default(),
            shape: ShapeStyle::default(),
            snap_threshold_px: default_snap_threshold(),
            tab_ratio: default_tab_ratio(),
            max_display_width: default_max_display_width(),
            muted: false,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects an unsupported grid size or a NaN/infinite knob, then clamps
    /// the numeric knobs.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        GridSize::new(self.grid_size)?;
        for (key, value) in [
            ("tab_ratio", self.tab_ratio),
            ("snap_threshold_px", self.snap_threshold_px),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { key });
            }
        }
        self.tab_ratio = self.tab_ratio.clamp(TAB_RATIO_MIN, TAB_RATIO_MAX);
        self.snap_threshold_px = self
            .snap_threshold_px
            .clamp(SNAP_THRESHOLD_MIN, SNAP_THRESHOLD_MAX);
        self.max_display_width = self.max_display_width.max(1);
        Ok(self)
    }
}
