// ============================================================================
// CANVAS: the addressable RGBA float pixel grid
// ============================================================================
//
// Logical coordinates have (0, 0) at the top-left with y growing downward.
// Storage is bottom-up (row 0 of the buffer is the bottom row on screen), the
// layout a GL-style blit expects. Every access goes through `storage_index`.
// ============================================================================

use rayon::prelude::*;

use crate::color::ColorData;
use crate::log_err;

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// A snapshot did not hold exactly width × height pixels.
    SizeMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasError::SizeMismatch { expected, actual } => write!(
                f,
                "snapshot holds {} pixels, canvas needs {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for CanvasError {}

/// Deep-copyable pixel buffer with a fixed size and background color.
/// `Clone` is the full deep copy used for frozen filter sources.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<ColorData>,
    background: ColorData,
}

impl Canvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: ColorData) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background_color(&self) -> ColorData {
        self.background
    }

    /// Raw pixels in storage (bottom-up) order.
    pub fn data(&self) -> &[ColorData] {
        &self.pixels
    }

    /// Map a logical (x, y) to the vertically flipped storage index.
    /// Callers must have validated the coordinate.
    #[inline]
    fn storage_index(&self, x: i32, y: i32) -> usize {
        x as usize + self.width as usize * (self.height as usize - 1 - y as usize)
    }

    /// Pure bounds predicate.
    #[inline]
    pub fn is_valid_pixel(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as i64) < self.width as i64 && (y as i64) < self.height as i64
    }

    /// Silent bounds-checked read for brush and filter loops.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<ColorData> {
        if self.is_valid_pixel(x, y) {
            Some(self.pixels[self.storage_index(x, y)])
        } else {
            None
        }
    }

    /// Bounds-checked read. Out-of-range coordinates are logged and yield
    /// the background color.
    pub fn get_pixel(&self, x: i32, y: i32) -> ColorData {
        match self.pixel(x, y) {
            Some(c) => c,
            None => {
                log_err!("get_pixel: x,y out of range: {} {}", x, y);
                self.background
            }
        }
    }

    /// Bounds-checked write. Out-of-range coordinates are logged and ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: ColorData) {
        if self.is_valid_pixel(x, y) {
            let idx = self.storage_index(x, y);
            self.pixels[idx] = color;
        } else {
            log_err!("set_pixel: x,y out of range: {} {}", x, y);
        }
    }

    /// Hot-path read; the caller has already checked `is_valid_pixel`.
    #[inline]
    pub fn get_valid_pixel(&self, x: i32, y: i32) -> ColorData {
        debug_assert!(self.is_valid_pixel(x, y), "get_valid_pixel({}, {})", x, y);
        self.pixels[self.storage_index(x, y)]
    }

    /// Hot-path write; the caller has already checked `is_valid_pixel`.
    #[inline]
    pub fn set_valid_pixel(&mut self, x: i32, y: i32, color: ColorData) {
        debug_assert!(self.is_valid_pixel(x, y), "set_valid_pixel({}, {})", x, y);
        let idx = self.storage_index(x, y);
        self.pixels[idx] = color;
    }

    pub fn fill(&mut self, color: ColorData) {
        self.pixels.fill(color);
    }

    /// Deep clone, background color included.
    pub fn copy(&self) -> Canvas {
        self.clone()
    }

    /// Owned snapshot of every pixel, for history.
    pub fn get_all_pixels(&self) -> Vec<ColorData> {
        self.pixels.clone()
    }

    /// Restore a snapshot taken with [`get_all_pixels`](Self::get_all_pixels).
    pub fn set_all_pixels(&mut self, snapshot: &[ColorData]) -> Result<(), CanvasError> {
        if snapshot.len() != self.pixels.len() {
            return Err(CanvasError::SizeMismatch {
                expected: self.pixels.len(),
                actual: snapshot.len(),
            });
        }
        self.pixels.copy_from_slice(snapshot);
        Ok(())
    }

    /// Replace every pixel with `f(pixel)`, in parallel.
    pub fn transform_pixels<F>(&mut self, f: F)
    where
        F: Fn(ColorData) -> ColorData + Sync,
    {
        self.pixels.par_iter_mut().for_each(|px| *px = f(*px));
    }

    /// Overwrite every pixel with `f(x, y)`. Rows are computed in parallel,
    /// so `f` must not observe this canvas; read from a frozen copy instead.
    pub fn map_each_pixel<F>(&mut self, f: F)
    where
        F: Fn(i32, i32) -> ColorData + Sync,
    {
        let w = self.width as usize;
        let h = self.height as usize;
        if w == 0 || h == 0 {
            return;
        }
        self.pixels
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(row, out)| {
                let y = (h - 1 - row) as i32;
                for (x, px) in out.iter_mut().enumerate() {
                    *px = f(x as i32, y);
                }
            });
    }
}
