//! Frame abstraction consumed by the engine and the raster it produces.

use image::{DynamicImage, RgbaImage};

use crate::color::Color;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Random-access raster owned by the decoding layer.
pub trait Frame {
    /// `(width, height)` in pixels.
    fn bounds(&self) -> (u32, u32);

    /// 8-bit RGBA pixel. `x`, `y` must lie inside [`Frame::bounds`].
    fn pixel_at(&self, x: u32, y: u32) -> [u8; 4];

    #[inline]
    fn contains(&self, p: Point) -> bool {
        let (width, height) = self.bounds();
        p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height
    }

    #[inline]
    fn color_at(&self, p: Point) -> Color {
        debug_assert!(self.contains(p), "{:?} outside {:?}", p, self.bounds());
        Color::from_rgba8(self.pixel_at(p.x as u32, p.y as u32))
    }
}

impl Frame for RgbaImage {
    #[inline]
    fn bounds(&self) -> (u32, u32) {
        self.dimensions()
    }

    #[inline]
    fn pixel_at(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

impl Frame for DynamicImage {
    #[inline]
    fn bounds(&self) -> (u32, u32) {
        image::GenericImageView::dimensions(self)
    }

    #[inline]
    fn pixel_at(&self, x: u32, y: u32) -> [u8; 4] {
        image::GenericImageView::get_pixel(self, x, y).0
    }
}

/// A frame plus the identity used as its motion-cache key (usually the source path
/// exactly as given by the caller).
#[derive(Debug, Clone)]
pub struct NamedFrame<F> {
    pub name: String,
    pub frame: F,
}

impl<F> NamedFrame<F> {
    pub fn new(name: impl Into<String>, frame: F) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

/// Output raster of the merge phase, one [`Color`] per pixel in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedImage {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl MergedImage {
    /// Black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    pub(crate) fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixels length must equal width * height"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn pixel_at(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set_pixel_at(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (dst, color) in out.pixels_mut().zip(&self.pixels) {
            dst.0 = color.to_rgba8();
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_contains_edges() {
        let img = RgbaImage::new(4, 3);
        assert!(img.contains(Point::new(0, 0)));
        assert!(img.contains(Point::new(3, 2)));
        assert!(!img.contains(Point::new(4, 0)));
        assert!(!img.contains(Point::new(0, 3)));
        assert!(!img.contains(Point::new(-1, 1)));
    }

    #[test]
    fn test_dynamic_image_matches_rgba() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([9, 8, 7, 255]));
        let dynamic = DynamicImage::ImageRgba8(img.clone());

        assert_eq!(Frame::bounds(&dynamic), (2, 2));
        assert_eq!(dynamic.pixel_at(1, 0), [9, 8, 7, 255]);
        assert_eq!(dynamic.color_at(Point::new(1, 0)), img.color_at(Point::new(1, 0)));
    }

    #[test]
    fn test_merged_image_set_and_export() {
        let mut merged = MergedImage::new(3, 2);
        let red = Color::from_rgba8([255, 0, 0, 255]);
        merged.set_pixel_at(2, 1, red);

        assert_eq!(merged.pixel_at(2, 1), red);
        assert_eq!(merged.pixel_at(0, 0), Color::BLACK);

        let rgba = merged.to_rgba_image();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(rgba.get_pixel(2, 1).0, [255, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    #[should_panic(expected = "outside 3x2")]
    fn test_merged_image_out_of_bounds_panics() {
        MergedImage::new(3, 2).pixel_at(3, 0);
    }

    #[test]
    fn test_point_offset() {
        assert_eq!(Point::new(2, 3).offset(-1, 4), Point::new(1, 7));
    }
}
