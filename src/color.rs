//! OKLCH color values, hex conversion and perceptual distance.

use csscolorparser::Color as CssColor;
use palette::convert::IntoColorUnclamped;
use palette::{IntoColor, LinSrgb, Oklab, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::RampError;

/// Tolerance for treating a linear sRGB channel as displayable.
const GAMUT_EPSILON: f64 = 1e-7;

/// Bisection iterations when reducing chroma into gamut.
const GAMUT_ITERATIONS: usize = 32;

/// Below this chroma the hue angle is meaningless and reported as 0.
const ACHROMATIC_CHROMA: f64 = 1e-6;

/// An OKLCH triple: lightness in `[0, 1]`, chroma `>= 0`, hue in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    /// Create a triple, normalizing each component into its valid range.
    pub fn new(l: f64, c: f64, h: f64) -> Self {
        Self {
            l: l.clamp(0.0, 1.0),
            c: c.max(0.0),
            h: normalize_hue(h),
        }
    }

    fn to_palette(self) -> palette::Oklch<f64> {
        palette::Oklch::new(self.l, self.c, self.h)
    }

    fn to_oklab(self) -> Oklab<f64> {
        self.to_palette().into_color_unclamped()
    }
}

/// A displayable color with its canonical `#rrggbb` hex and OKLCH values.
///
/// The OKLCH values are always derived from the hex, so the two representations
/// round-trip within quantization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub hex: String,
    pub oklch: Oklch,
}

impl Color {
    /// Parse any CSS color string (hex, `rgb()`, named colors).
    ///
    /// # Example
    ///
    /// ```
    /// use rampforge::color::Color;
    ///
    /// let amber = Color::parse("#FFD24D").unwrap();
    /// assert_eq!(amber.hex, "#ffd24d");
    /// assert!(amber.oklch.l > 0.8);
    /// ```
    pub fn parse(input: &str) -> Result<Self, RampError> {
        to_oklch(input)
    }

    /// Build a color from 8-bit sRGB channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        let srgb: Srgb<f64> = Srgb::new(red, green, blue).into_format();
        let lch: palette::Oklch<f64> = srgb.into_linear().into_color();

        let chroma = lch.chroma.max(0.0);
        let hue = if chroma < ACHROMATIC_CHROMA {
            0.0
        } else {
            lch.hue.into_positive_degrees()
        };

        Self {
            hex: format!("#{red:02x}{green:02x}{blue:02x}"),
            oklch: Oklch::new(lch.l, chroma, hue),
        }
    }

    /// Realize a requested OKLCH triple as a displayable color.
    ///
    /// Chroma is reduced into the sRGB gamut when needed; lightness and hue are kept.
    pub fn from_oklch(target: Oklch) -> Self {
        let [red, green, blue] = to_rgb8(target);
        Self::from_rgb8(red, green, blue)
    }

    pub fn lightness(&self) -> f64 {
        self.oklch.l
    }

    pub fn chroma(&self) -> f64 {
        self.oklch.c
    }

    pub fn hue(&self) -> f64 {
        self.oklch.h
    }
}

/// Parse a color string into a [`Color`].
pub fn to_oklch(input: &str) -> Result<Color, RampError> {
    let css = input
        .trim()
        .parse::<CssColor>()
        .map_err(|e| RampError::InvalidColor {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
    let [red, green, blue, _alpha] = css.to_rgba8();
    Ok(Color::from_rgb8(red, green, blue))
}

/// Convert an OKLCH triple to a `#rrggbb` hex string.
///
/// Never fails: out-of-gamut chroma is reduced to the largest displayable value.
pub fn to_hex(oklch: Oklch) -> String {
    let [red, green, blue] = to_rgb8(oklch);
    format!("#{red:02x}{green:02x}{blue:02x}")
}

/// Largest displayable chroma at the given lightness and hue, up to `oklch.c`.
pub fn max_displayable_chroma(oklch: Oklch) -> f64 {
    if in_gamut(linear_rgb(oklch.l, oklch.c, oklch.h)) {
        return oklch.c;
    }

    let (mut lo, mut hi) = (0.0, oklch.c);
    for _ in 0..GAMUT_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        if in_gamut(linear_rgb(oklch.l, mid, oklch.h)) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Approximate perceptual difference between two colors.
///
/// Euclidean distance in OKLab scaled by 100, so a difference around 2 is
/// roughly the limit of what is noticeable side by side. Symmetric and zero
/// for identical colors.
pub fn perceptual_distance(a: &Color, b: &Color) -> f64 {
    oklch_distance(a.oklch, b.oklch)
}

/// [`perceptual_distance`] on raw OKLCH triples.
pub fn oklch_distance(a: Oklch, b: Oklch) -> f64 {
    let lab_a = a.to_oklab();
    let lab_b = b.to_oklab();
    let dl = lab_a.l - lab_b.l;
    let da = lab_a.a - lab_b.a;
    let db = lab_a.b - lab_b.b;
    100.0 * (dl * dl + da * da + db * db).sqrt()
}

/// Shortest angular distance between two hues, in degrees (`0..=180`).
pub fn circular_hue_distance(h1: f64, h2: f64) -> f64 {
    let diff = (normalize_hue(h1) - normalize_hue(h2)).abs();
    diff.min(360.0 - diff)
}

/// Wrap a hue angle into `[0, 360)`.
pub fn normalize_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn linear_rgb(l: f64, c: f64, h: f64) -> LinSrgb<f64> {
    palette::Oklch::new(l, c, h).into_color_unclamped()
}

fn in_gamut(color: LinSrgb<f64>) -> bool {
    [color.red, color.green, color.blue]
        .iter()
        .all(|&ch| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(&ch))
}

fn to_rgb8(oklch: Oklch) -> [u8; 3] {
    let oklch = Oklch::new(oklch.l, oklch.c, oklch.h);
    let chroma = max_displayable_chroma(oklch);
    let srgb: Srgb<f64> = Srgb::from_linear(linear_rgb(oklch.l, chroma, oklch.h));
    [srgb.red, srgb.green, srgb.blue].map(|ch| (ch.clamp(0.0, 1.0) * 255.0).round() as u8)
}
