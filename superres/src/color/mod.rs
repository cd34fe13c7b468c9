//! Perceptual color model.
//!
//! Colors live in CIE L*a*b* (D65) with lightness scaled to [0, 1], so the
//! Euclidean distance between two colors is a cheap approximation of how
//! different they look. Every constructor goes through sRGB gamut clamping,
//! which keeps lightness non-negative and the color convertible back to 8-bit RGB.

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};

use palette::convert::IntoColorUnclamped;
use palette::{FromColor, Lab, LinSrgb, Srgb};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Palette expresses lightness in [0, 100]; this module keeps it in [0, 1].
const LAB_SCALE: f32 = 100.0;

/// Float noise allowed when checking whether a Lab triple maps back into the sRGB cube.
const GAMUT_EPSILON: f32 = 1e-4;

static INVALID_COLOR_REPORTED: AtomicBool = AtomicBool::new(false);

/// Errors produced by the color model.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ColorError {
    #[error("Color components {0:?} are not representable in gamut")]
    InvalidColor([f32; 3]),

    #[error("Color distance is undefined between {0:?} and {1:?}")]
    UndefinedDistance(Color, Color),
}

/// Immutable perceptual color (lightness, a, b).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    l: f32,
    a: f32,
    b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        l: 0.0,
        a: 0.0,
        b: 0.0,
    };

    /// Converts an 8-bit RGBA pixel. Alpha is ignored.
    #[inline]
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let [r, g, b, _] = rgba;
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Converts gamma-corrected sRGB components, clamping them into [0, 1] first.
    pub fn try_from_rgb(r: f32, g: f32, b: f32) -> Result<Self, ColorError> {
        if !(r.is_finite() && g.is_finite() && b.is_finite()) {
            return Err(ColorError::InvalidColor([r, g, b]));
        }

        let srgb = Srgb::new(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
        let lab: Lab = Lab::from_color(srgb.into_linear());

        let color = Self {
            l: (lab.l / LAB_SCALE).max(0.0),
            a: lab.a / LAB_SCALE,
            b: lab.b / LAB_SCALE,
        };
        if !color.is_finite() {
            return Err(ColorError::InvalidColor([r, g, b]));
        }
        Ok(color)
    }

    /// Infallible [`Color::try_from_rgb`]; unrepresentable input becomes black.
    #[inline]
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::try_from_rgb(r, g, b).unwrap_or_else(recover_invalid)
    }

    /// Builds a color from a Lab triple, clamping it to the sRGB gamut when it falls outside.
    pub fn try_from_lab(l: f32, a: f32, b: f32) -> Result<Self, ColorError> {
        if !(l.is_finite() && a.is_finite() && b.is_finite()) {
            return Err(ColorError::InvalidColor([l, a, b]));
        }

        let [r, g, bl] = lab_to_srgb_unclamped(l, a, b);
        let in_gamut = [r, g, bl]
            .iter()
            .all(|c| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(c));

        if in_gamut && l >= 0.0 {
            Ok(Self { l, a, b })
        } else {
            Self::try_from_rgb(r, g, bl)
        }
    }

    /// Infallible [`Color::try_from_lab`]; unrepresentable input becomes black.
    #[inline]
    pub fn from_lab(l: f32, a: f32, b: f32) -> Self {
        Self::try_from_lab(l, a, b).unwrap_or_else(recover_invalid)
    }

    #[inline]
    pub fn lightness(&self) -> f32 {
        self.l
    }

    #[inline]
    pub fn a(&self) -> f32 {
        self.a
    }

    #[inline]
    pub fn b(&self) -> f32 {
        self.b
    }

    #[inline]
    pub fn lab(&self) -> [f32; 3] {
        [self.l, self.a, self.b]
    }

    /// Gamma-corrected sRGB components in [0, 1].
    pub fn to_srgb(&self) -> [f32; 3] {
        lab_to_srgb_unclamped(self.l, self.a, self.b).map(|c| c.clamp(0.0, 1.0))
    }

    /// Opaque 8-bit RGBA pixel.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let [r, g, b] = self.to_srgb().map(|c| (c * 255.0).round() as u8);
        [r, g, b, u8::MAX]
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.l.is_finite() && self.a.is_finite() && self.b.is_finite()
    }
}

fn lab_to_srgb_unclamped(l: f32, a: f32, b: f32) -> [f32; 3] {
    let lab: Lab = Lab::new(l * LAB_SCALE, a * LAB_SCALE, b * LAB_SCALE);
    let linear: LinSrgb = lab.into_color_unclamped();
    let srgb: Srgb = Srgb::from_linear(linear);
    [srgb.red, srgb.green, srgb.blue]
}

fn recover_invalid(err: ColorError) -> Color {
    if !INVALID_COLOR_REPORTED.swap(true, Ordering::Relaxed) {
        tracing::warn!("{err}, substituting black (further occurrences are not reported)");
    }
    Color::BLACK
}

/// Perceptual difference between two colors, clamped into [-1, 1].
pub fn try_distance(c1: Color, c2: Color) -> Result<f32, ColorError> {
    let dl = c1.l - c2.l;
    let da = c1.a - c2.a;
    let db = c1.b - c2.b;
    let d = (dl * dl + da * da + db * db).sqrt();

    if d.is_nan() {
        return Err(ColorError::UndefinedDistance(c1, c2));
    }
    Ok(d.clamp(-1.0, 1.0))
}

/// Infallible [`try_distance`]; an undefined distance counts as maximally dissimilar.
#[inline]
pub fn distance(c1: Color, c2: Color) -> f32 {
    match try_distance(c1, c2) {
        Ok(d) => d,
        Err(err) => {
            tracing::debug!("{err}, treating as maximally dissimilar");
            1.0
        }
    }
}

/// Componentwise mean of the Lab triples, clamped to gamut.
///
/// # Panics
/// Panics if `colors` is empty.
pub fn merge_average(colors: &[Color]) -> Color {
    assert!(!colors.is_empty(), "Cannot merge an empty color list");

    if colors.len() == 1 {
        return colors[0];
    }

    let (mut l, mut a, mut b) = (0.0f64, 0.0f64, 0.0f64);
    for c in colors {
        l += c.l as f64;
        a += c.a as f64;
        b += c.b as f64;
    }
    let n = colors.len() as f64;

    Color::from_lab((l / n) as f32, (a / n) as f32, (b / n) as f32)
}

/// Median by lightness.
///
/// Sorts `colors` in place (stable, by lightness). Odd counts return the middle
/// color unchanged; even counts return the Lab midpoint of the two central
/// colors, clamped to gamut.
///
/// # Panics
/// Panics if `colors` is empty.
pub fn merge_median(colors: &mut [Color]) -> Color {
    assert!(!colors.is_empty(), "Cannot merge an empty color list");

    let n = colors.len();
    if n == 1 {
        return colors[0];
    }

    colors.sort_by(|x, y| x.l.total_cmp(&y.l));

    let mid = n / 2;
    if n % 2 == 1 {
        return colors[mid];
    }

    let lo = colors[mid - 1];
    let hi = colors[mid];
    Color::from_lab(
        (lo.l + hi.l) * 0.5,
        (lo.a + hi.a) * 0.5,
        (lo.b + hi.b) * 0.5,
    )
}

/// Reducer applied to the motion-corrected samples of one output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MergeMethod {
    /// Componentwise Lab mean. Lowest noise, sensitive to misaligned frames.
    Average,
    /// Median by lightness. Robust to outliers.
    #[default]
    Median,
}

impl MergeMethod {
    /// Reduces `colors` to one color. May reorder `colors`.
    #[inline]
    pub fn merge(self, colors: &mut [Color]) -> Color {
        match self {
            MergeMethod::Average => merge_average(colors),
            MergeMethod::Median => merge_median(colors),
        }
    }
}
