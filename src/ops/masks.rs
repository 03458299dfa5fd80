// ============================================================================
// MASK ENGINE: square, odd-sized grids centered on a gesture coordinate
// ============================================================================
//
// Three kinds of cell payload share one container:
//   - intensity masks (`Mask`, f64) for brushes
//   - absolute-color masks (`StampMask`, ColorData + alpha) for stamps
//   - kernel selectors (`BlurToolMask`, u32) for the blur tool
// Side lengths are forced odd so the center cell is well defined.
// ============================================================================

use std::collections::HashMap;
use std::path::Path;

use crate::canvas::Canvas;
use crate::color::ColorData;
use crate::io::{AsciiRaster, RasterError, load_ascii_raster};
use crate::ops::filters::{ConvolutionKernel, KernelFamily};
use crate::log_warn;

/// Width of one checkerboard band in the fallback stamp.
const CHECKER_BAND: usize = 10;

/// Bump an even size to the next odd one.
#[inline]
pub fn force_odd(n: usize) -> usize {
    if n % 2 == 0 { n + 1 } else { n }
}

// ============================================================================
// GRID: contiguous row-major square storage
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    fn filled(size: usize, value: T) -> Self {
        Self { size, cells: vec![value; size * size] }
    }
}

impl<T> Grid<T> {
    fn from_fn<F: FnMut(usize, usize) -> T>(size: usize, mut f: F) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                cells.push(f(col, row));
            }
        }
        Self { size, cells }
    }

    /// Side length (always odd for masks built here).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the center cell along either axis.
    pub fn center(&self) -> usize {
        self.size / 2
    }

    pub fn get(&self, col: usize, row: usize) -> &T {
        &self.cells[row * self.size + col]
    }

    fn set(&mut self, col: usize, row: usize, value: T) {
        let idx = row * self.size + col;
        self.cells[idx] = value;
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Every cell paired with the canvas coordinate it covers when the grid
    /// is centered on (`cx`, `cy`). Coordinates may fall off the canvas.
    pub fn footprint(&self, cx: i32, cy: i32) -> impl Iterator<Item = (&T, i32, i32)> + '_ {
        let half = (self.size / 2) as i32;
        let size = self.size;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let col = (i % size) as i32;
            let row = (i / size) as i32;
            (cell, cx + col - half, cy + row - half)
        })
    }
}

// ============================================================================
// INTENSITY MASKS
// ============================================================================

/// Per-cell blend intensity. Positive paints toward the active color,
/// non-positive erases toward the background.
pub type Mask = Grid<f64>;

impl Mask {
    /// Uniform `width × height` block centered in a zero-padded square.
    pub fn rectangle(width: usize, height: usize, intensity: f64) -> Mask {
        let mask_width = force_odd(width);
        let mask_height = force_odd(height);
        let size = mask_width.max(mask_height);
        let col_start = (size - mask_width) / 2;
        let row_start = (size - mask_height) / 2;

        Grid::from_fn(size, |col, row| {
            let inside = (col_start..col_start + mask_width).contains(&col)
                && (row_start..row_start + mask_height).contains(&row);
            if inside { intensity } else { 0.0 }
        })
    }

    /// Disc with a linear ramp from `center_intensity` at the middle to
    /// `outer_intensity` at the rim. Cells beyond the radius are 0.
    pub fn circle(diameter: usize, center_intensity: f64, outer_intensity: f64) -> Mask {
        let size = force_odd(diameter);
        let center = diameter / 2;
        let falloff = if center > 0 {
            (outer_intensity - center_intensity) / center as f64
        } else {
            0.0
        };

        Grid::from_fn(size, |col, row| {
            let dx = col as f64 - center as f64;
            let dy = row as f64 - center as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > center as f64 {
                return 0.0;
            }
            let intensity = center_intensity + falloff * distance;
            // Never ramp past the rim value in either direction.
            if (falloff < 0.0 && intensity < outer_intensity)
                || (falloff > 0.0 && intensity > outer_intensity)
            {
                outer_intensity
            } else {
                intensity
            }
        })
    }
}

// ============================================================================
// STAMP MASKS
// ============================================================================

/// Absolute colors; cells with alpha ≤ 0 are transparent.
pub type StampMask = Grid<ColorData>;

impl StampMask {
    /// Center a whole canvas in a transparent square. Colors are clamped.
    pub fn from_canvas(source: &Canvas) -> StampMask {
        let w = source.width() as usize;
        let h = source.height() as usize;
        let size = force_odd(w.max(h));
        let pad_left = (size - w) / 2;
        let pad_top = (size - h) / 2;

        Grid::from_fn(size, |col, row| {
            if col < pad_left || row < pad_top || col >= pad_left + w || row >= pad_top + h {
                ColorData::TRANSPARENT
            } else {
                source
                    .get_valid_pixel((col - pad_left) as i32, (row - pad_top) as i32)
                    .clamped_color()
            }
        })
    }

    /// Nearest-neighbour resample of `raster` into a `width × height` block
    /// centered in a transparent square, every opaque cell carrying `alpha`.
    pub fn from_raster(raster: &AsciiRaster, width: usize, height: usize, alpha: f32) -> StampMask {
        let (size, col_start, row_start, mask_width, mask_height) = stamp_frame(width, height);
        let base_w = raster.width;
        let base_h = raster.height;
        let scale_w = mask_width as f64 / base_w as f64;
        let scale_h = mask_height as f64 / base_h as f64;

        Grid::from_fn(size, |col, row| {
            if !(row_start..row_start + mask_height).contains(&row)
                || !(col_start..col_start + mask_width).contains(&col)
            {
                return ColorData::TRANSPARENT;
            }
            let base_row = (((row - row_start) as f64 / scale_h) as usize).min(base_h - 1);
            let base_col = (((col - col_start) as f64 / scale_w) as usize).min(base_w - 1);
            let [r, g, b] = raster.rgb(base_col, base_row);
            ColorData::new(r, g, b, alpha)
        })
    }

    /// Black/red diagonal bands standing in for an unreadable stamp source.
    pub fn checkerboard(width: usize, height: usize) -> StampMask {
        let (size, col_start, row_start, mask_width, mask_height) = stamp_frame(width, height);
        let mut grid = Grid::filled(size, ColorData::TRANSPARENT);
        for row in row_start..row_start + mask_height {
            for col in col_start..col_start + mask_width {
                let color = if (row + col) % (2 * CHECKER_BAND) < CHECKER_BAND {
                    ColorData::BLACK
                } else {
                    ColorData::rgb(1.0, 0.0, 0.0)
                };
                grid.set(col, row, color);
            }
        }
        grid
    }

    /// Build a stamp from an ASCII raster file. A file that cannot be read
    /// falls back to [`checkerboard`](Self::checkerboard); a malformed one is
    /// an error so the caller can keep its previous stamp.
    pub fn from_raster_file(
        path: &Path,
        width: usize,
        height: usize,
        alpha: f32,
    ) -> Result<StampMask, RasterError> {
        match load_ascii_raster(path) {
            Ok(raster) => Ok(Self::from_raster(&raster, width, height, alpha)),
            Err(RasterError::Io(e)) => {
                log_warn!(
                    "could not open stamp description '{}': {}; using red & black stripes",
                    path.display(),
                    e
                );
                Ok(Self::checkerboard(width, height))
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_transparent_at(&self, col: usize, row: usize) -> bool {
        self.get(col, row).alpha <= 0.0
    }
}

/// (side, col_start, row_start, inner width, inner height) for a
/// `width × height` block centered in an odd square.
fn stamp_frame(width: usize, height: usize) -> (usize, usize, usize, usize, usize) {
    let mask_width = force_odd(width);
    let mask_height = force_odd(height);
    let size = mask_width.max(mask_height);
    (
        size,
        (size - mask_width) / 2,
        (size - mask_height) / 2,
        mask_width,
        mask_height,
    )
}

// ============================================================================
// BLUR TOOL MASK: per-cell kernel selectors plus a lazy kernel table
// ============================================================================

#[derive(Clone, Debug)]
pub struct BlurToolMask {
    selectors: Grid<u32>,
    kernels: HashMap<u32, ConvolutionKernel>,
}

impl BlurToolMask {
    /// Selectors derived from a circular ramp: `diameter / 2` blur radius at
    /// the center fading to 0.5 at the rim (which rounds to "no blur").
    pub fn new(diameter: usize) -> Self {
        let ramp = Mask::circle(diameter, (diameter / 2) as f64, 0.5);
        Self::from_intensity(&ramp)
    }

    /// Round each intensity half-to-even, and step even selectors down to odd.
    pub fn from_intensity(mask: &Mask) -> Self {
        let selectors = Grid::from_fn(mask.size(), |col, row| {
            let rounded = mask.get(col, row).round_ties_even().max(0.0) as u32;
            if rounded != 0 && rounded % 2 == 0 { rounded - 1 } else { rounded }
        });
        Self { selectors, kernels: HashMap::new() }
    }

    pub fn selectors(&self) -> &Grid<u32> {
        &self.selectors
    }

    pub fn size(&self) -> usize {
        self.selectors.size()
    }

    /// Kernel for `selector`, built on first request.
    pub fn kernel_for(&mut self, selector: u32) -> &ConvolutionKernel {
        self.kernels
            .entry(selector)
            .or_insert_with(|| ConvolutionKernel::new(selector as f64, KernelFamily::Blur))
    }

    /// Number of kernels built so far.
    pub fn cached_kernels(&self) -> usize {
        self.kernels.len()
    }
}
