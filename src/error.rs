// Crate error type. Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error("camera init error: {0}")]
    CameraInit(String),
    #[error("camera frame error: {0}")]
    CameraFrame(String),
    #[error("palette asset {path:?}: {reason}")]
    PaletteAsset { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("landmark detector error: {0}")]
    Detector(String),
    #[error("frame is {actual:?} but the session canvas is {expected:?}")]
    FrameSize { expected: (usize, usize), actual: (usize, usize) },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
