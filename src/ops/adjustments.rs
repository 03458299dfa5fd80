// ============================================================================
// ADJUSTMENT OPERATIONS: pointwise whole-canvas color transforms
// ============================================================================
//
// Same iteration contract as the convolution pass but no neighbourhood: each
// output pixel depends only on the pixel it replaces, so they run in place.
// ============================================================================

use crate::canvas::Canvas;
use crate::color::ColorData;

/// Each RGB channel becomes 1 if it is at least `level`, else 0. Alpha kept.
pub fn threshold(canvas: &mut Canvas, level: f32) {
    canvas.transform_pixels(|c| threshold_pixel(c, level));
}

pub fn threshold_pixel(c: ColorData, level: f32) -> ColorData {
    c.map_rgb(|v| if v >= level { 1.0 } else { 0.0 })
}

/// Blend toward (|amount| < 1) or away from (|amount| > 1) the pixel's
/// grayscale luminance. A negative amount inverts the channels first.
pub fn saturate(canvas: &mut Canvas, amount: f32) {
    canvas.transform_pixels(|c| saturate_pixel(c, amount));
}

pub fn saturate_pixel(c: ColorData, amount: f32) -> ColorData {
    let base = if amount < 0.0 { c.map_rgb(|v| 1.0 - v) } else { c };
    let mag = amount.abs();
    let gray = ColorData::gray(base.luminance());
    let mut out = (base * mag + gray * (1.0 - mag)).clamped_color();
    out.alpha = c.alpha.clamp(0.0, 1.0);
    out
}

/// Scale R, G and B independently, clamped to [0, 1].
pub fn channels(canvas: &mut Canvas, red: f32, green: f32, blue: f32) {
    canvas.transform_pixels(|c| channels_pixel(c, red, green, blue));
}

pub fn channels_pixel(c: ColorData, red: f32, green: f32, blue: f32) -> ColorData {
    ColorData::new(c.red * red, c.green * green, c.blue * blue, c.alpha).clamped_color()
}

/// Snap each RGB channel to the nearest of `bins` evenly spaced levels in
/// [0, 1]. Fewer than two bins leaves the canvas untouched.
pub fn quantize(canvas: &mut Canvas, bins: u32) {
    if bins <= 1 {
        return;
    }
    canvas.transform_pixels(|c| quantize_pixel(c, bins));
}

pub fn quantize_pixel(c: ColorData, bins: u32) -> ColorData {
    if bins <= 1 {
        return c;
    }
    let steps = (bins - 1) as f32;
    c.map_rgb(|v| (v * steps).round_ties_even() / steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ColorData, b: ColorData) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn threshold_maps_equality_to_one() {
        let out = threshold_pixel(ColorData::new(0.4, 0.6, 0.5, 1.0), 0.5);
        assert_eq!(out, ColorData::new(0.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn threshold_keeps_alpha() {
        let mut canvas = Canvas::new(2, 2, ColorData::new(0.7, 0.2, 0.9, 0.25));
        threshold(&mut canvas, 0.5);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::new(1.0, 0.0, 1.0, 0.25));
    }

    #[test]
    fn quantize_two_bins() {
        let out = quantize_pixel(ColorData::new(0.6, 0.4, 0.0, 1.0), 2);
        assert_eq!(out, ColorData::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn quantize_snaps_to_even_levels() {
        let out = quantize_pixel(ColorData::rgb(0.3, 0.5, 0.9), 5);
        assert!(close(out, ColorData::rgb(0.25, 0.5, 1.0)));
    }

    #[test]
    fn quantize_single_bin_is_noop() {
        let mut canvas = Canvas::new(2, 1, ColorData::rgb(0.3, 0.3, 0.3));
        quantize(&mut canvas, 1);
        assert_eq!(canvas.get_pixel(0, 0), ColorData::rgb(0.3, 0.3, 0.3));
    }

    #[test]
    fn saturate_extremes() {
        let c = ColorData::rgb(0.8, 0.2, 0.4);
        assert!(close(saturate_pixel(c, 1.0), c));
        let gray = saturate_pixel(c, 0.0);
        let lum = c.luminance();
        assert!(close(gray, ColorData::gray(lum)));
        let inverted = saturate_pixel(c, -1.0);
        assert!(close(inverted, ColorData::rgb(0.2, 0.8, 0.6)));
    }

    #[test]
    fn saturate_preserves_alpha() {
        let out = saturate_pixel(ColorData::new(0.5, 0.5, 0.5, 0.3), 2.0);
        assert!((out.alpha - 0.3).abs() < 1e-6);
    }

    #[test]
    fn channels_scale_and_clamp() {
        let mut canvas = Canvas::new(1, 1, ColorData::rgb(0.5, 0.5, 0.5));
        channels(&mut canvas, 3.0, 0.5, 1.0);
        assert_eq!(canvas.get_pixel(0, 0), ColorData::rgb(1.0, 0.25, 0.5));
    }
}
