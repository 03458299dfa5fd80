// ============================================================================
// COLOR DATA: linear RGBA float tuple with component-wise arithmetic
// ============================================================================
//
// Channels are unconstrained during intermediate arithmetic (brush blends and
// kernel accumulation routinely leave [0, 1]); callers clamp on demand with
// `clamped_color()`.
// ============================================================================

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Rec.601 luma weights used by the luminance-aware brushes and saturation.
pub const LUMA_RED: f32 = 0.2989;
pub const LUMA_GREEN: f32 = 0.5870;
pub const LUMA_BLUE: f32 = 0.1140;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Default for ColorData {
    /// Opaque white.
    fn default() -> Self {
        Self::WHITE
    }
}

impl ColorData {
    pub const WHITE: ColorData = ColorData::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: ColorData = ColorData::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: ColorData = ColorData::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Opaque color from three channels.
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value, 1.0)
    }

    pub fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Perceptual brightness of the RGB channels (alpha ignored).
    pub fn luminance(&self) -> f32 {
        LUMA_RED * self.red + LUMA_GREEN * self.green + LUMA_BLUE * self.blue
    }

    /// Copy with every channel clamped into [0, 1].
    pub fn clamped_color(&self) -> ColorData {
        ColorData::new(
            self.red.clamp(0.0, 1.0),
            self.green.clamp(0.0, 1.0),
            self.blue.clamp(0.0, 1.0),
            self.alpha.clamp(0.0, 1.0),
        )
    }

    /// Linear blend: `self * (1 - t) + other * t`.
    pub fn lerp(self, other: ColorData, t: f32) -> ColorData {
        self * (1.0 - t) + other * t
    }

    /// Apply `f` to the three color channels, keeping alpha.
    pub fn map_rgb<F: Fn(f32) -> f32>(self, f: F) -> ColorData {
        ColorData::new(f(self.red), f(self.green), f(self.blue), self.alpha)
    }
}

impl Add for ColorData {
    type Output = ColorData;

    fn add(self, rhs: ColorData) -> ColorData {
        ColorData::new(
            self.red + rhs.red,
            self.green + rhs.green,
            self.blue + rhs.blue,
            self.alpha + rhs.alpha,
        )
    }
}

impl Sub for ColorData {
    type Output = ColorData;

    fn sub(self, rhs: ColorData) -> ColorData {
        ColorData::new(
            self.red - rhs.red,
            self.green - rhs.green,
            self.blue - rhs.blue,
            self.alpha - rhs.alpha,
        )
    }
}

impl Mul<f32> for ColorData {
    type Output = ColorData;

    fn mul(self, s: f32) -> ColorData {
        ColorData::new(self.red * s, self.green * s, self.blue * s, self.alpha * s)
    }
}

impl Mul<f64> for ColorData {
    type Output = ColorData;

    fn mul(self, s: f64) -> ColorData {
        self * (s as f32)
    }
}
