use crate::editor::DEFAULT_PAINT_COLOR;
use crate::render::PaintOptions;
use crate::scene::{parse_hex_rgb, rgb_to_hex, Rgb, DEFAULT_BACKGROUND};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV: &str = "SCENEPAINT_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub background: String,
    pub paint_color: String,
    /// Fixed seed for shape colors; random when absent.
    pub seed: Option<u64>,
    pub show_light_helpers: bool,
    pub grid_size: f32,
    pub grid_divisions: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            background: rgb_to_hex(DEFAULT_BACKGROUND),
            paint_color: rgb_to_hex(DEFAULT_PAINT_COLOR),
            seed: None,
            show_light_helpers: false,
            grid_size: 20.0,
            grid_divisions: 20,
        }
    }
}

impl EditorConfig {
    /// Reads the file named by `SCENEPAINT_CONFIG`, falling back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        let path = Path::new(&path);
        match load_config(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io(err)) => {
                log::info!("No config at {} ({err}); using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn background_rgb(&self) -> Rgb {
        parse_color(&self.background, DEFAULT_BACKGROUND, "background")
    }

    pub fn paint_rgb(&self) -> Rgb {
        parse_color(&self.paint_color, DEFAULT_PAINT_COLOR, "paint_color")
    }

    pub fn paint_options(&self) -> PaintOptions {
        PaintOptions {
            show_light_helpers: self.show_light_helpers,
            grid_size: if self.grid_size > 0.0 { self.grid_size } else { 20.0 },
            grid_divisions: self.grid_divisions.max(1),
        }
    }
}

fn parse_color(value: &str, fallback: Rgb, field: &str) -> Rgb {
    parse_hex_rgb(value).unwrap_or_else(|| {
        log::warn!("Invalid {field} color {value:?}; using {}", rgb_to_hex(fallback));
        fallback
    })
}

pub fn load_config(path: &Path) -> Result<EditorConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EditorConfig = serde_json::from_str(&json)?;
    Ok(config)
}
