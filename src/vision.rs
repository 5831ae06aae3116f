// Frame-level image operations: conversion from `image` buffers,
// mirroring, resizing and header blits.
use std::path::Path;

use image::{RgbImage, imageops::FilterType};

use crate::error::Error;
use crate::types::FrameBuffer;

/// Pack an RGB image into 0x00RRGGBB pixels.
pub fn from_rgb_image(img: &RgbImage) -> FrameBuffer {
    let (w, h) = img.dimensions();
    let mut out = Vec::with_capacity((w as usize) * (h as usize));
    for pixel in img.pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        out.push((r << 16) | (g << 8) | b);
    }
    FrameBuffer { width: w as usize, height: h as usize, pixels: out }
}

/// Flip left/right in place so the feed behaves like a mirror.
pub fn mirror_in_place(fb: &mut FrameBuffer) {
    if fb.width == 0 {
        return;
    }
    for row in fb.pixels.chunks_exact_mut(fb.width) {
        row.reverse();
    }
}

/// Nearest-neighbour resize. Returns the input untouched when sizes match.
pub fn resize_nearest(src: FrameBuffer, width: usize, height: usize) -> FrameBuffer {
    if src.width == width && src.height == height {
        return src;
    }
    let mut out = FrameBuffer::blank(width, height);
    if src.width == 0 || src.height == 0 {
        return out;
    }
    for y in 0..height {
        let sy = y * src.height / height;
        let src_row = sy * src.width;
        let dst_row = y * width;
        for x in 0..width {
            let sx = x * src.width / width;
            out.pixels[dst_row + x] = src.pixels[src_row + sx];
        }
    }
    out
}

/// Copy `overlay` onto the top-left of `frame`, clipped to both.
pub fn blit_top(frame: &mut FrameBuffer, overlay: &FrameBuffer) {
    let w = frame.width.min(overlay.width);
    let h = frame.height.min(overlay.height);
    for y in 0..h {
        let dst = y * frame.width;
        let src = y * overlay.width;
        frame.pixels[dst..dst + w].copy_from_slice(&overlay.pixels[src..src + w]);
    }
}

/// Load a palette overlay and stretch it to exactly `width` x `height`.
pub fn load_overlay(path: &Path, width: usize, height: usize) -> Result<FrameBuffer, Error> {
    let img = image::open(path).map_err(|e| Error::PaletteAsset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let resized = image::imageops::resize(&img.to_rgb8(), width as u32, height as u32, FilterType::Triangle);
    Ok(from_rgb_image(&resized))
}
