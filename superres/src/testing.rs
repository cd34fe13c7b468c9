//! Synthetic frames for tests.

use image::{Rgba, RgbaImage};

/// Smooth, non-periodic color texture.
pub fn texture(x: f64, y: f64) -> Rgba<u8> {
    let r = 128.0 + 60.0 * (0.21 * x + 0.13 * y).sin() + 50.0 * (0.061 * x - 0.09 * y).cos();
    let g = 128.0 + 70.0 * (0.17 * y - 0.05 * x).sin() + 40.0 * (0.031 * (x + y)).sin();
    let b = 128.0 + 55.0 * (0.11 * x).cos() * (0.083 * y).sin() + 45.0 * (0.29 * x - 0.07 * y).sin();
    Rgba([
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
        255,
    ])
}

/// [`texture`] magnified by `scale` and moved by `(sx, sy)` output pixels, so
/// that `scene(w, h, s, sx, sy)(x + sx, y + sy) == scene(w, h, s, 0, 0)(x, y)`.
pub fn scene(width: u32, height: u32, scale: f64, sx: i32, sy: i32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        texture(
            (x as i32 - sx) as f64 / scale,
            (y as i32 - sy) as f64 / scale,
        )
    })
}

/// Horizontal gray ramp moved right by `sx`.
pub fn ramp(width: u32, height: u32, sx: i32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        let v = (x as i32 - sx + 40).clamp(0, 255) as u8;
        Rgba([v, v, v, 255])
    })
}

pub fn flat(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}
