// Configuration surface: every constant the painter uses, overridable from JSON.
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Color;

const APP_DIR: &str = "gesture-paint";
const APP_CONFIG_FILE: &str = "config.json";

/// One palette swatch: a horizontal hit range inside the header band, in
/// reference-resolution pixels, plus what selecting it does.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwatchConfig {
    pub min_x: i32,
    pub max_x: i32,
    pub color: [u8; 3],
    /// Overlay file name inside `header_dir`. `None` = i-th image by name.
    #[serde(default)]
    pub overlay: Option<String>,
}

impl SwatchConfig {
    fn new(min_x: i32, max_x: i32, color: [u8; 3]) -> Self {
        Self { min_x, max_x, color, overlay: None }
    }
}

/// How to launch the external hand-landmark helper.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["scripts/hand_landmarks.py".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    pub camera_index: u32,
    pub capture_width: u32,
    pub capture_height: u32,
    /// Frames are resized to this before processing; camera size when unset.
    pub display_width: Option<usize>,
    pub display_height: Option<usize>,
    pub mirror: bool,

    pub brush_thickness: u32,
    pub eraser_thickness: u32,
    pub cursor_radius: u32,
    pub select_line_thickness: u32,

    pub header_height: usize,
    pub header_dir: PathBuf,
    /// Width the swatch ranges were authored for.
    pub reference_width: u32,
    pub swatches: Vec<SwatchConfig>,
    pub default_color: [u8; 3],

    pub canvas_threshold: u8,
    pub min_detection_confidence: f32,
    pub detector: DetectorConfig,

    pub show_fps: bool,
    pub show_landmarks: bool,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            capture_width: 1280,
            capture_height: 720,
            display_width: None,
            display_height: None,
            mirror: true,
            brush_thickness: 15,
            eraser_thickness: 100,
            cursor_radius: 15,
            select_line_thickness: 3,
            header_height: 125,
            header_dir: PathBuf::from("header_images"),
            reference_width: 1280,
            swatches: vec![
                SwatchConfig::new(355, 460, [0, 255, 255]),   // aqua blue
                SwatchConfig::new(475, 560, [245, 225, 47]),  // yellow
                SwatchConfig::new(610, 685, [245, 47, 197]),  // pink
                SwatchConfig::new(755, 865, [56, 242, 81]),   // leafy green
                SwatchConfig::new(1060, 1220, [0, 0, 0]),     // eraser
            ],
            default_color: [56, 242, 81],
            canvas_threshold: 50,
            min_detection_confidence: 0.85,
            detector: DetectorConfig::default(),
            show_fps: true,
            show_landmarks: true,
        }
    }
}

impl PainterConfig {
    pub fn default_color(&self) -> Color {
        self.default_color.into()
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.eraser_thickness <= self.brush_thickness {
            return Err(Error::Config(format!(
                "eraser_thickness ({}) must be greater than brush_thickness ({})",
                self.eraser_thickness, self.brush_thickness
            )));
        }
        if self.brush_thickness == 0 {
            return Err(Error::Config("brush_thickness must be at least 1".into()));
        }
        if self.header_height == 0 {
            return Err(Error::Config("header_height must be at least 1".into()));
        }
        if self.reference_width == 0 {
            return Err(Error::Config("reference_width must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(Error::Config(format!(
                "min_detection_confidence ({}) must lie in [0, 1]",
                self.min_detection_confidence
            )));
        }
        if self.swatches.is_empty() {
            return Err(Error::Config("at least one swatch is required".into()));
        }
        for (i, s) in self.swatches.iter().enumerate() {
            if s.min_x >= s.max_x {
                return Err(Error::Config(format!("swatch {i}: min_x must be below max_x")));
            }
        }
        let mut ranges: Vec<(i32, i32)> = self.swatches.iter().map(|s| (s.min_x, s.max_x)).collect();
        ranges.sort_unstable();
        // Hit tests are exclusive on both ends, so touching ranges are fine.
        if ranges.windows(2).any(|w| w[1].0 < w[0].1) {
            return Err(Error::Config("swatch ranges overlap".into()));
        }
        if let (Some(w), Some(h)) = (self.display_width, self.display_height) {
            if w == 0 || h == 0 {
                return Err(Error::Config("display size must be non-zero".into()));
            }
        }
        Ok(())
    }
}

/// Resolve the configuration for this run.
///
/// An explicit path must load; the per-user file falls back to defaults with a
/// warning. The result is validated either way.
pub fn load(explicit: Option<&Path>) -> Result<PainterConfig> {
    let config = match explicit {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            let config = parse(&contents)?;
            info!("loaded configuration from {path:?}");
            config
        }
        None => {
            let (xdg_config_home, home) = config_env_dirs();
            load_user_config_with(xdg_config_home.as_deref(), home.as_deref())
        }
    };
    config.validate()?;
    Ok(config)
}

pub fn parse(contents: &str) -> Result<PainterConfig> {
    serde_json::from_str(contents).map_err(|e| Error::Config(e.to_string()))
}

fn load_user_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> PainterConfig {
    let Some(path) = app_config_path(xdg_config_home, home) else {
        return PainterConfig::default();
    };
    if !path.exists() {
        info!("no configuration at {path:?}; using defaults");
        return PainterConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => match parse(&contents) {
            Ok(config) => {
                info!("loaded configuration from {path:?}");
                config
            }
            Err(err) => {
                warn!("failed to parse {path:?}: {err}; using defaults");
                PainterConfig::default()
            }
        },
        Err(err) => {
            warn!("failed to read {path:?}: {err}; using defaults");
            PainterConfig::default()
        }
    }
}

fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn app_config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let root = match xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home?.join(".config"),
    };
    Some(root.join(APP_DIR).join(APP_CONFIG_FILE))
}
