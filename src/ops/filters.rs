// ============================================================================
// CONVOLUTION ENGINE: integer kernels, edge-aware single-pixel application,
// and the named filter catalogue
// ============================================================================

use std::str::FromStr;

use crate::canvas::Canvas;
use crate::color::ColorData;
use crate::ops::adjustments;
use crate::{log_info, log_warn};

/// Radius used by the fixed-size edge-detect and emboss filters.
const FIXED_FILTER_RADIUS: f64 = 1.5;
/// Bias added by the emboss filter so flat regions land on mid-gray.
const EMBOSS_BIAS: f32 = 0.5;

/// Accepted parameter ranges, inclusive.
const BLUR_RANGE: (f64, f64) = (0.0, 20.0);
const MOTION_BLUR_RANGE: (f64, f64) = (0.0, 100.0);
const SHARPEN_RANGE: (f64, f64) = (0.0, 100.0);
const THRESHOLD_RANGE: (f32, f32) = (0.0, 1.0);
const SATURATE_RANGE: (f32, f32) = (-10.0, 10.0);
const CHANNEL_RANGE: (f32, f32) = (0.0, 10.0);
const QUANTIZE_RANGE: (u32, u32) = (2, 256);
/// Largest kernel side built; radius 100 gives 201.
const MAX_KERNEL_SIDE: usize = 201;

// ============================================================================
// KERNEL FAMILIES
// ============================================================================

/// Weight generator selecting how a kernel is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelFamily {
    /// Diamond of ones around the center.
    Blur,
    BlurNorthSouth,
    BlurEastWest,
    BlurNorthEastSouthWest,
    BlurNorthWestSouthEast,
    Sharpen,
    EdgeDetect,
    Emboss,
}

impl KernelFamily {
    /// Weight at column `x`, row `y` of a `side × side` kernel.
    pub fn weight(self, x: usize, y: usize, side: usize) -> i32 {
        let mid = side / 2;
        match self {
            KernelFamily::Blur => {
                let fold_x = if x <= mid { x } else { side - x - 1 };
                let fold_y = if y <= mid { y } else { side - y - 1 };
                i32::from(fold_x + fold_y >= mid)
            }
            KernelFamily::BlurNorthSouth => i32::from(x == mid),
            KernelFamily::BlurEastWest => i32::from(y == mid),
            KernelFamily::BlurNorthEastSouthWest => i32::from(x + y == side - 1),
            KernelFamily::BlurNorthWestSouthEast => i32::from(x == y),
            KernelFamily::Sharpen => {
                if x == mid && y == mid {
                    (side * 2 - 1) as i32
                } else if x == mid || y == mid {
                    -1
                } else {
                    0
                }
            }
            // Only the center column is weighted. The sum is side² - side, so
            // flat regions keep their color.
            KernelFamily::EdgeDetect => {
                if x != mid {
                    0
                } else if y == mid {
                    (side * side - 1) as i32
                } else {
                    -1
                }
            }
            KernelFamily::Emboss => match (x + y).cmp(&(side - 1)) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Greater => 1,
                std::cmp::Ordering::Equal => 0,
            },
        }
    }
}

/// Streak direction for motion blur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    NorthSouth,
    #[default]
    EastWest,
    NorthEastSouthWest,
    NorthWestSouthEast,
}

impl Direction {
    pub fn kernel_family(self) -> KernelFamily {
        match self {
            Direction::NorthSouth => KernelFamily::BlurNorthSouth,
            Direction::EastWest => KernelFamily::BlurEastWest,
            Direction::NorthEastSouthWest => KernelFamily::BlurNorthEastSouthWest,
            Direction::NorthWestSouthEast => KernelFamily::BlurNorthWestSouthEast,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::NorthSouth => "North/South",
            Direction::EastWest => "East/West",
            Direction::NorthEastSouthWest => "NorthEast/SouthWest",
            Direction::NorthWestSouthEast => "NorthWest/SouthEast",
        }
    }

    pub fn all() -> &'static [Direction] {
        &[
            Direction::NorthSouth,
            Direction::EastWest,
            Direction::NorthEastSouthWest,
            Direction::NorthWestSouthEast,
        ]
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['/', '_'], "-").as_str() {
            "ns" | "n-s" | "north-south" => Ok(Direction::NorthSouth),
            "ew" | "e-w" | "east-west" => Ok(Direction::EastWest),
            "nesw" | "ne-sw" | "northeast-southwest" => Ok(Direction::NorthEastSouthWest),
            "nwse" | "nw-se" | "northwest-southeast" => Ok(Direction::NorthWestSouthEast),
            other => Err(format!("unknown direction '{}' (expected ns, ew, ne-sw, nw-se)", other)),
        }
    }
}

// ============================================================================
// CONVOLUTION KERNEL
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ConvolutionKernel {
    side: usize,
    weights: Vec<i32>,
    family: KernelFamily,
}

impl ConvolutionKernel {
    /// Build a kernel of side `round(radius * 2)` (half-to-even), forced odd.
    /// The side is capped at 201; a non-finite radius builds the 1×1 kernel.
    pub fn new(radius: f64, family: KernelFamily) -> Self {
        let width = if radius.is_finite() {
            (radius * 2.0).round_ties_even().clamp(0.0, MAX_KERNEL_SIDE as f64) as usize
        } else {
            log_warn!("kernel radius {} is not finite", radius);
            0
        };
        let side = if width % 2 == 0 { (width + 1).min(MAX_KERNEL_SIDE) } else { width };
        let mut weights = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                weights.push(family.weight(x, y, side));
            }
        }
        Self { side, weights, family }
    }

    pub fn size(&self) -> usize {
        self.side
    }

    pub fn family(&self) -> KernelFamily {
        self.family
    }

    pub fn weight(&self, x: usize, y: usize) -> i32 {
        self.weights[y * self.side + x]
    }

    /// Sum of all weights, ignoring canvas bounds.
    pub fn weight_sum(&self) -> i32 {
        self.weights.iter().sum()
    }

    /// Kernel cells with the canvas coordinate each lands on around (x, y).
    fn footprint(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let off = (self.side / 2) as i32;
        let side = self.side;
        self.weights.iter().enumerate().map(move |(i, &w)| {
            let kx = (i % side) as i32;
            let ky = (i / side) as i32;
            (x + kx - off, y + ky - off, w)
        })
    }

    /// Sum of the weights whose footprint cells land on the canvas.
    pub fn used_weight(&self, source: &Canvas, x: i32, y: i32) -> i32 {
        self.footprint(x, y)
            .filter(|&(sx, sy, _)| source.is_valid_pixel(sx, sy))
            .map(|(_, _, w)| w)
            .sum()
    }

    /// Convolve `source` around (x, y). Off-canvas cells contribute neither
    /// color nor weight, so borders do not darken. Degenerate (≤ 0) weight
    /// sums fall back to a divisor of 1. The target pixel keeps its alpha.
    pub fn apply(&self, source: &Canvas, x: i32, y: i32, bias: f32) -> ColorData {
        let used = self.used_weight(source, x, y);
        let factor = if used <= 0 { 1.0 } else { 1.0 / used as f32 };

        let mut acc = ColorData::TRANSPARENT;
        for (sx, sy, w) in self.footprint(x, y) {
            if w != 0
                && let Some(c) = source.pixel(sx, sy)
            {
                acc = acc + c * w as f32;
            }
        }

        let alpha = source.pixel(x, y).map_or(1.0, |c| c.alpha);
        let bias_color = ColorData::new(bias, bias, bias, 0.0);
        let mut out = acc * factor + bias_color;
        out.alpha = alpha;
        out.clamped_color()
    }
}

/// Full-image pass: every pixel is computed from a frozen copy taken before
/// the pass, then written into the live canvas.
pub fn convolve(canvas: &mut Canvas, kernel: &ConvolutionKernel, bias: f32) {
    let frozen = canvas.copy();
    canvas.map_each_pixel(|x, y| kernel.apply(&frozen, x, y, bias));
}

// ============================================================================
// FILTER CATALOGUE
// ============================================================================

/// Every whole-image filter the engine offers, with its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Filter {
    Blur { amount: f64 },
    MotionBlur { amount: f64, direction: Direction },
    Sharpen { amount: f64 },
    EdgeDetect,
    Emboss,
    Threshold { level: f32 },
    Saturate { amount: f32 },
    Channels { red: f32, green: f32, blue: f32 },
    Quantize { bins: u32 },
}

impl Filter {
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Blur { .. } => "Blur",
            Filter::MotionBlur { .. } => "Motion Blur",
            Filter::Sharpen { .. } => "Sharpen",
            Filter::EdgeDetect => "Edge Detect",
            Filter::Emboss => "Emboss",
            Filter::Threshold { .. } => "Threshold",
            Filter::Saturate { .. } => "Saturate",
            Filter::Channels { .. } => "Channels",
            Filter::Quantize { .. } => "Quantize",
        }
    }

    /// Kernel and bias for the convolution filters; `None` for pointwise ones.
    pub fn kernel(&self) -> Option<(ConvolutionKernel, f32)> {
        match *self {
            Filter::Blur { amount } => Some((ConvolutionKernel::new(amount, KernelFamily::Blur), 0.0)),
            Filter::MotionBlur { amount, direction } => {
                Some((ConvolutionKernel::new(amount, direction.kernel_family()), 0.0))
            }
            Filter::Sharpen { amount } => {
                Some((ConvolutionKernel::new(amount, KernelFamily::Sharpen), 0.0))
            }
            Filter::EdgeDetect => Some((
                ConvolutionKernel::new(FIXED_FILTER_RADIUS, KernelFamily::EdgeDetect),
                0.0,
            )),
            Filter::Emboss => Some((
                ConvolutionKernel::new(FIXED_FILTER_RADIUS, KernelFamily::Emboss),
                EMBOSS_BIAS,
            )),
            _ => None,
        }
    }

    pub fn apply(&self, canvas: &mut Canvas) {
        log_info!("apply filter {:?}", self);
        if let Some((kernel, bias)) = self.kernel() {
            convolve(canvas, &kernel, bias);
            return;
        }
        match *self {
            Filter::Threshold { level } => adjustments::threshold(canvas, level),
            Filter::Saturate { amount } => adjustments::saturate(canvas, amount),
            Filter::Channels { red, green, blue } => adjustments::channels(canvas, red, green, blue),
            Filter::Quantize { bins } => adjustments::quantize(canvas, bins),
            _ => {}
        }
    }
}

/// Parse one parameter and check it lies in `range`. NaN fails every
/// comparison, so it is rejected along with the infinities.
fn parse_number<T>(name: &str, value: Option<&str>, range: (T, T)) -> Result<T, String>
where
    T: FromStr + PartialOrd + std::fmt::Display,
{
    let raw = value.ok_or_else(|| format!("filter '{}' is missing a parameter", name))?;
    let v = raw
        .trim()
        .parse::<T>()
        .map_err(|_| format!("filter '{}': invalid parameter '{}'", name, raw))?;
    let (lo, hi) = range;
    if v >= lo && v <= hi {
        Ok(v)
    } else {
        Err(format!("filter '{}': parameter '{}' outside {}..={}", name, raw.trim(), lo, hi))
    }
}

impl FromStr for Filter {
    type Err = String;

    /// `name[:p1[,p2...]]`, e.g. `blur:3`, `motion-blur:5,ns`, `channels:1,0.5,1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, params) = match s.split_once(':') {
            Some((n, p)) => (n, p),
            None => (s, ""),
        };
        let name = name.trim().to_lowercase();
        let mut args = params.split(',').map(str::trim).filter(|p| !p.is_empty());
        let n = name.as_str();

        let filter = match n {
            "blur" => Filter::Blur { amount: parse_number(n, args.next(), BLUR_RANGE)? },
            "motion-blur" | "motionblur" => Filter::MotionBlur {
                amount: parse_number(n, args.next(), MOTION_BLUR_RANGE)?,
                direction: match args.next() {
                    Some(d) => d.parse()?,
                    None => Direction::default(),
                },
            },
            "sharpen" => Filter::Sharpen { amount: parse_number(n, args.next(), SHARPEN_RANGE)? },
            "edge" | "edge-detect" => Filter::EdgeDetect,
            "emboss" | "special" => Filter::Emboss,
            "threshold" => Filter::Threshold { level: parse_number(n, args.next(), THRESHOLD_RANGE)? },
            "saturate" | "saturation" => {
                Filter::Saturate { amount: parse_number(n, args.next(), SATURATE_RANGE)? }
            }
            "channels" | "channel" => Filter::Channels {
                red: parse_number(n, args.next(), CHANNEL_RANGE)?,
                green: parse_number(n, args.next(), CHANNEL_RANGE)?,
                blue: parse_number(n, args.next(), CHANNEL_RANGE)?,
            },
            "quantize" => Filter::Quantize { bins: parse_number(n, args.next(), QUANTIZE_RANGE)? },
            other => return Err(format!("unknown filter '{}'", other)),
        };

        if let Some(extra) = args.next() {
            return Err(format!("filter '{}': unexpected parameter '{}'", n, extra));
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel_rows(k: &ConvolutionKernel) -> Vec<Vec<i32>> {
        (0..k.size())
            .map(|y| (0..k.size()).map(|x| k.weight(x, y)).collect())
            .collect()
    }

    fn checker(w: u32, h: u32) -> Canvas {
        let mut canvas = Canvas::new(w, h, ColorData::WHITE);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let v = ((x * 7 + y * 3) % 5) as f32 / 4.0;
                canvas.set_pixel(x, y, ColorData::rgb(v, 1.0 - v, v * 0.5));
            }
        }
        canvas
    }

    #[test]
    fn side_is_rounded_and_forced_odd() {
        assert_eq!(ConvolutionKernel::new(1.5, KernelFamily::Blur).size(), 3);
        assert_eq!(ConvolutionKernel::new(2.0, KernelFamily::Blur).size(), 5);
        assert_eq!(ConvolutionKernel::new(1.25, KernelFamily::Blur).size(), 3);
        assert_eq!(ConvolutionKernel::new(0.0, KernelFamily::Blur).size(), 1);
    }

    #[test]
    fn blur_is_a_diamond() {
        let k = ConvolutionKernel::new(2.5, KernelFamily::Blur);
        assert_eq!(
            kernel_rows(&k),
            vec![
                vec![0, 0, 1, 0, 0],
                vec![0, 1, 1, 1, 0],
                vec![1, 1, 1, 1, 1],
                vec![0, 1, 1, 1, 0],
                vec![0, 0, 1, 0, 0],
            ]
        );
    }

    #[test]
    fn directional_blurs_are_lines() {
        let ns = ConvolutionKernel::new(1.5, KernelFamily::BlurNorthSouth);
        assert_eq!(kernel_rows(&ns), vec![vec![0, 1, 0]; 3]);
        let ew = ConvolutionKernel::new(1.5, KernelFamily::BlurEastWest);
        assert_eq!(kernel_rows(&ew), vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]]);
        let nesw = ConvolutionKernel::new(1.5, KernelFamily::BlurNorthEastSouthWest);
        assert_eq!(kernel_rows(&nesw), vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]);
        let nwse = ConvolutionKernel::new(1.5, KernelFamily::BlurNorthWestSouthEast);
        assert_eq!(kernel_rows(&nwse), vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn sharpen_edge_and_emboss_weights() {
        let sharpen = ConvolutionKernel::new(1.5, KernelFamily::Sharpen);
        assert_eq!(kernel_rows(&sharpen), vec![vec![0, -1, 0], vec![-1, 5, -1], vec![0, -1, 0]]);
        assert_eq!(sharpen.weight_sum(), 1);

        let edge = ConvolutionKernel::new(1.5, KernelFamily::EdgeDetect);
        assert_eq!(kernel_rows(&edge), vec![vec![0, -1, 0], vec![0, 8, 0], vec![0, -1, 0]]);
        assert_eq!(edge.weight_sum(), 6);

        let emboss = ConvolutionKernel::new(1.5, KernelFamily::Emboss);
        assert_eq!(kernel_rows(&emboss), vec![vec![-1, -1, 0], vec![-1, 0, 1], vec![0, 1, 1]]);
        assert_eq!(emboss.weight_sum(), 0);
    }

    #[test]
    fn interior_pixels_use_the_whole_kernel() {
        let canvas = checker(9, 9);
        for family in [KernelFamily::Blur, KernelFamily::Sharpen, KernelFamily::Emboss] {
            let k = ConvolutionKernel::new(1.5, family);
            for y in 1..8 {
                for x in 1..8 {
                    assert_eq!(k.used_weight(&canvas, x, y), k.weight_sum());
                    let c = k.apply(&canvas, x, y, 0.0);
                    for v in c.to_array() {
                        assert!((0.0..=1.0).contains(&v));
                    }
                }
            }
        }
    }

    #[test]
    fn corner_weight_only_counts_on_canvas_cells() {
        let canvas = Canvas::new(4, 4, ColorData::WHITE);
        let k = ConvolutionKernel::new(1.5, KernelFamily::Blur);
        // Plus-shaped kernel at a corner keeps center, right and down.
        assert_eq!(k.used_weight(&canvas, 0, 0), 3);
    }

    #[test]
    fn blur_leaves_flat_canvas_unchanged() {
        let color = ColorData::rgb(0.3, 0.6, 0.9);
        let mut canvas = Canvas::new(7, 5, color);
        convolve(&mut canvas, &ConvolutionKernel::new(3.0, KernelFamily::Blur), 0.0);
        for &c in canvas.data() {
            assert!((c.red - 0.3).abs() < 1e-5);
            assert!((c.green - 0.6).abs() < 1e-5);
            assert!((c.blue - 0.9).abs() < 1e-5);
            assert_eq!(c.alpha, 1.0);
        }
    }

    #[test]
    fn degenerate_sum_uses_unit_divisor() {
        // Emboss at the bottom-right corner only sees its negative half.
        let canvas = Canvas::new(3, 3, ColorData::gray(0.5));
        let k = ConvolutionKernel::new(1.5, KernelFamily::Emboss);
        assert_eq!(k.used_weight(&canvas, 2, 2), -3);
        let c = k.apply(&canvas, 2, 2, 0.5);
        // 0.5 * -3 with divisor 1, plus bias 0.5, clamps to 0.
        assert_eq!(c.red, 0.0);
        assert_eq!(c.alpha, 1.0);
        let c = k.apply(&canvas, 2, 2, 2.0);
        assert!((c.red - 0.5).abs() < 1e-6);
    }

    #[test]
    fn full_pass_reads_from_frozen_copy() {
        let mut canvas = Canvas::new(3, 1, ColorData::BLACK);
        canvas.set_pixel(0, 0, ColorData::WHITE);
        let k = ConvolutionKernel::new(1.5, KernelFamily::BlurEastWest);
        convolve(&mut canvas, &k, 0.0);
        // x=1 averages (1, 0, 0); x=2 averages the *unfiltered* (0, 0).
        assert!((canvas.get_pixel(0, 0).red - 0.5).abs() < 1e-6);
        assert!((canvas.get_pixel(1, 0).red - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(canvas.get_pixel(2, 0).red, 0.0);
    }

    #[test]
    fn emboss_flat_region_is_mid_gray() {
        let mut canvas = Canvas::new(5, 5, ColorData::gray(0.8));
        Filter::Emboss.apply(&mut canvas);
        let c = canvas.get_pixel(2, 2);
        assert!((c.red - 0.5).abs() < 1e-6);
    }

    #[test]
    fn edge_detect_keeps_flat_color() {
        let mut canvas = Canvas::new(5, 5, ColorData::gray(0.8));
        Filter::EdgeDetect.apply(&mut canvas);
        for &c in canvas.data() {
            assert!((c.red - 0.8).abs() < 1e-5);
        }
    }

    #[test]
    fn filters_parse_from_cli_strings() {
        assert_eq!("blur:3".parse::<Filter>(), Ok(Filter::Blur { amount: 3.0 }));
        assert_eq!(
            "motion-blur:5,ns".parse::<Filter>(),
            Ok(Filter::MotionBlur { amount: 5.0, direction: Direction::NorthSouth })
        );
        assert_eq!("edge".parse::<Filter>(), Ok(Filter::EdgeDetect));
        assert_eq!(
            "channels:1,0.5,2".parse::<Filter>(),
            Ok(Filter::Channels { red: 1.0, green: 0.5, blue: 2.0 })
        );
        assert!("quantize".parse::<Filter>().is_err());
        assert!("blur:x".parse::<Filter>().is_err());
        assert!("blur:1,2".parse::<Filter>().is_err());
        assert!("posterize:4".parse::<Filter>().is_err());
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        for spec in [
            "blur:inf",
            "blur:NaN",
            "blur:21",
            "blur:-1",
            "sharpen:1e9",
            "motion-blur:101,ns",
            "threshold:1.5",
            "saturate:-11",
            "channels:1,11,1",
            "quantize:1",
            "quantize:257",
        ] {
            assert!(spec.parse::<Filter>().is_err(), "accepted {}", spec);
        }
        assert_eq!("blur:20".parse::<Filter>(), Ok(Filter::Blur { amount: 20.0 }));
        assert_eq!("quantize:256".parse::<Filter>(), Ok(Filter::Quantize { bins: 256 }));
    }

    #[test]
    fn kernel_side_is_bounded() {
        assert_eq!(ConvolutionKernel::new(f64::INFINITY, KernelFamily::Blur).size(), 1);
        assert_eq!(ConvolutionKernel::new(f64::NAN, KernelFamily::Blur).size(), 1);
        assert_eq!(ConvolutionKernel::new(1e6, KernelFamily::Sharpen).size(), 201);
        assert_eq!(ConvolutionKernel::new(100.0, KernelFamily::Sharpen).size(), 201);
    }
}
