// Palette swatches in the header band: where they are, what they select,
// and the header overlay each one shows.
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{PainterConfig, SwatchConfig};
use crate::error::Error;
use crate::types::{Color, FrameBuffer, Point};
use crate::vision::load_overlay;

/// Horizontal hit range inside the header band, exclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitRegion {
    pub min_x: i32,
    pub max_x: i32,
}

impl HitRegion {
    #[inline]
    pub fn contains(self, x: i32) -> bool {
        self.min_x < x && x < self.max_x
    }
}

/// Hit regions and colours, already scaled to the display width.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteLayout {
    pub header_height: usize,
    pub regions: Vec<HitRegion>,
    pub colors: Vec<Color>,
}

impl PaletteLayout {
    /// Scale reference-width ranges linearly to `display_width`, truncating.
    pub fn scaled(swatches: &[SwatchConfig], reference_width: u32, display_width: usize, header_height: usize) -> Self {
        let factor = display_width as f64 / reference_width as f64;
        let scale = |v: i32| (v as f64 * factor) as i32;
        Self {
            header_height,
            regions: swatches
                .iter()
                .map(|s| HitRegion { min_x: scale(s.min_x), max_x: scale(s.max_x) })
                .collect(),
            colors: swatches.iter().map(|s| Color::from(s.color)).collect(),
        }
    }

    pub fn from_config(config: &PainterConfig, display_width: usize) -> Self {
        Self::scaled(&config.swatches, config.reference_width, display_width, config.header_height)
    }

    /// Swatch under `p`, if `p` is inside the header band. First match wins.
    pub fn hit(&self, p: Point) -> Option<usize> {
        if p.y < 0 || p.y >= self.header_height as i32 {
            return None;
        }
        self.regions.iter().position(|r| r.contains(p.x))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }
}

/// Layout plus one header overlay per swatch.
pub struct Palette {
    pub layout: PaletteLayout,
    overlays: Vec<FrameBuffer>,
}

impl Palette {
    pub fn new(layout: PaletteLayout, overlays: Vec<FrameBuffer>) -> Result<Self, Error> {
        if overlays.len() != layout.len() {
            return Err(Error::PaletteAsset {
                path: PathBuf::new(),
                reason: format!("{} swatches but {} overlays", layout.len(), overlays.len()),
            });
        }
        Ok(Self { layout, overlays })
    }

    /// Load the overlay of every configured swatch, resized to the header band.
    /// Missing or undecodable images are fatal.
    pub fn load(config: &PainterConfig, display_width: usize) -> Result<Self, Error> {
        let layout = PaletteLayout::from_config(config, display_width);
        let paths = overlay_paths(&config.header_dir, &config.swatches)?;
        let overlays = paths
            .iter()
            .map(|p| load_overlay(p, display_width, config.header_height))
            .collect::<Result<Vec<_>, _>>()?;
        info!("loaded {} palette overlays from {:?}", overlays.len(), config.header_dir);
        Self::new(layout, overlays)
    }

    pub fn overlay(&self, swatch: usize) -> &FrameBuffer {
        &self.overlays[swatch]
    }
}

/// Explicit file names win; the rest take images from `dir` in name order.
fn overlay_paths(dir: &Path, swatches: &[SwatchConfig]) -> Result<Vec<PathBuf>, Error> {
    let listing = || -> Result<Vec<PathBuf>, Error> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::PaletteAsset {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    };

    let mut listed: Option<Vec<PathBuf>> = None;
    let mut out = Vec::with_capacity(swatches.len());
    for (i, swatch) in swatches.iter().enumerate() {
        match &swatch.overlay {
            Some(name) => out.push(dir.join(name)),
            None => {
                if listed.is_none() {
                    listed = Some(listing()?);
                }
                let files = listed.as_deref().unwrap_or_default();
                let path = files.get(i).ok_or_else(|| Error::PaletteAsset {
                    path: dir.to_path_buf(),
                    reason: format!("no header image for swatch {i} ({} found)", files.len()),
                })?;
                out.push(path.clone());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_layout(width: usize) -> PaletteLayout {
        let config = PainterConfig::default();
        PaletteLayout::from_config(&config, width)
    }

    #[test]
    fn reference_width_keeps_literal_boundaries() {
        let layout = reference_layout(1280);
        let bounds: Vec<(i32, i32)> = layout.regions.iter().map(|r| (r.min_x, r.max_x)).collect();
        assert_eq!(bounds, vec![(355, 460), (475, 560), (610, 685), (755, 865), (1060, 1220)]);
    }

    #[test]
    fn regions_scale_linearly_with_display_width() {
        let layout = reference_layout(1920);
        assert_eq!(layout.regions[0], HitRegion { min_x: 532, max_x: 690 });
        assert_eq!(layout.regions[4], HitRegion { min_x: 1590, max_x: 1830 });

        let layout = reference_layout(640);
        assert_eq!(layout.regions[2], HitRegion { min_x: 305, max_x: 342 });
    }

    #[test]
    fn hit_requires_header_band() {
        let layout = reference_layout(1280);
        assert_eq!(layout.hit(Point::new(400, 50)), Some(0));
        assert_eq!(layout.hit(Point::new(400, 124)), Some(0));
        assert_eq!(layout.hit(Point::new(400, 125)), None);
    }

    #[test]
    fn hit_bounds_are_exclusive() {
        let layout = reference_layout(1280);
        assert_eq!(layout.hit(Point::new(355, 50)), None);
        assert_eq!(layout.hit(Point::new(356, 50)), Some(0));
        assert_eq!(layout.hit(Point::new(460, 50)), None);
        assert_eq!(layout.hit(Point::new(1219, 50)), Some(4));
        assert_eq!(layout.hit(Point::new(900, 50)), None);
    }

    #[test]
    fn eraser_swatch_is_black() {
        let layout = reference_layout(1280);
        assert_eq!(layout.colors[4], Color::BLACK);
    }

    #[test]
    fn overlay_count_must_match_swatches() {
        let layout = reference_layout(1280);
        assert!(Palette::new(layout, vec![FrameBuffer::blank(1, 1)]).is_err());
    }

    #[test]
    fn missing_header_dir_is_a_palette_error() {
        let config = PainterConfig {
            header_dir: PathBuf::from("/nonexistent/header_images"),
            ..PainterConfig::default()
        };
        assert!(matches!(Palette::load(&config, 1280), Err(Error::PaletteAsset { .. })));
    }

    #[test]
    fn explicit_overlay_names_skip_the_listing() {
        let mut swatches = PainterConfig::default().swatches;
        for (i, s) in swatches.iter_mut().enumerate() {
            s.overlay = Some(format!("{i}.png"));
        }
        let paths = overlay_paths(Path::new("/nonexistent"), &swatches).unwrap();
        assert_eq!(paths[3], PathBuf::from("/nonexistent/3.png"));
    }
}
