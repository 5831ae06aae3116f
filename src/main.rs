// Gesture Paint
// • Raise your index finger: paint with the current colour.
// • Raise index + middle: select mode; touch a swatch in the header to switch
//   colour (the last swatch is the eraser).
// • Any other pose: idle.
// • Esc or q quits.

mod camera;
mod compositor;
mod config;
mod draw;
mod error;
mod fingers;
mod gesture;
mod hud;
mod landmarks;
mod palette;
mod session;
mod stroke;
mod types;
mod vision;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::{debug, info};

use camera::{CameraCapture, FrameSource};
use draw::{Drawer, FrameSink};
use hud::FpsCounter;
use landmarks::{HelperProcessSource, LandmarkSource};
use palette::Palette;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = config_arg(std::env::args().skip(1))?;
    let config = config::load(config_path.as_deref()).context("loading configuration")?;

    let mut cam = CameraCapture::new(config.camera_index, config.capture_width, config.capture_height)
        .context("opening camera")?;
    let (cam_w, cam_h) = cam.resolution();
    let width = config.display_width.unwrap_or(cam_w as usize);
    let height = config.display_height.unwrap_or(cam_h as usize);
    info!("painting at {width}x{height}");

    let palette = Palette::load(&config, width).context("loading palette overlays")?;
    let mut detector = HelperProcessSource::spawn(&config.detector, config.min_detection_confidence)
        .context("starting landmark detector")?;
    let mut drawer = Drawer::new("Gesture Paint", width, height)?;
    let mut session = Session::new(&config, palette, width, height);

    let frames = run(
        &mut cam,
        &mut detector,
        &mut session,
        &mut drawer,
        config.show_landmarks,
        config.show_fps,
    )
    .context("painting loop stopped")?;

    info!("shutting down after {frames} frames");
    Ok(())
}

/// Pump frames until the sink closes. Returns how many frames were shown.
///
/// Blocks on the camera for each frame; a dead camera ends the session with
/// its error.
fn run(
    frames: &mut dyn FrameSource,
    detector: &mut dyn LandmarkSource,
    session: &mut Session,
    sink: &mut dyn FrameSink,
    show_landmarks: bool,
    show_fps: bool,
) -> error::Result<usize> {
    let mut fps = FpsCounter::new(Instant::now());
    let mut last_mode = None;
    let mut shown = 0;

    while sink.is_open() {
        let raw = frames.next_frame()?;

        let (mut frame, report) = session.process_frame(raw, detector, show_landmarks)?;
        if report.mode != last_mode {
            debug!("mode {:?} -> {:?}", last_mode, report.mode);
            last_mode = report.mode;
        }

        if let Some(reading) = fps.tick(Instant::now()) {
            info!("FPS: {reading:.1}");
        }
        if show_fps {
            hud::draw_fps(&mut frame, fps.fps());
        }

        sink.present(&frame)?;
        shown += 1;
    }
    Ok(shown)
}

/// `--config <path>` or `--config=<path>`; nothing else is accepted.
fn config_arg(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--config=") {
            path = Some(PathBuf::from(value));
        } else if arg == "--config" {
            let value = args.next().context("--config needs a path")?;
            path = Some(PathBuf::from(value));
        } else {
            bail!("unexpected argument {arg:?} (usage: gesture-paint [--config <path>])");
        }
    }
    Ok(path)
}
