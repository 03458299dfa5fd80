use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::canvas::Canvas;
use crate::color::ColorData;
use crate::io::RasterError;
use crate::ops::masks::{BlurToolMask, Mask, StampMask};
use crate::{log_err, log_info, log_warn};

/// Built-in decorative stamp loaded by the `Stamper` tool.
pub const DEFAULT_STAMP_NAME: &str = "pink-roses";
/// Extension of the ASCII raster stamp descriptions.
const STAMP_EXTENSION: &str = "ppm";

// ============================================================================
// TOOL IDENTIFIERS
// ============================================================================

/// Stable key for every tool on the belt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ToolId {
    #[default]
    Pen,
    Eraser,
    SprayCan,
    CalligraphyPen,
    Highlighter,
    Stamp,
    Blur,
    Stamper,
}

impl ToolId {
    pub fn label(&self) -> &'static str {
        match self {
            ToolId::Pen => "Pen",
            ToolId::Eraser => "Eraser",
            ToolId::SprayCan => "Spray Can",
            ToolId::CalligraphyPen => "Calligraphy Pen",
            ToolId::Highlighter => "Highlighter",
            ToolId::Stamp => "Stamp",
            ToolId::Blur => "Blur",
            ToolId::Stamper => "Stamper",
        }
    }

    pub fn all() -> &'static [ToolId] {
        &[
            ToolId::Pen,
            ToolId::Eraser,
            ToolId::SprayCan,
            ToolId::CalligraphyPen,
            ToolId::Highlighter,
            ToolId::Stamp,
            ToolId::Blur,
            ToolId::Stamper,
        ]
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        ToolId::all()
            .iter()
            .copied()
            .find(|id| id.label().to_lowercase().replace(' ', "-") == wanted)
            .or(match wanted.as_str() {
                "spray" | "spraycan" => Some(ToolId::SprayCan),
                "calligraphy" => Some(ToolId::CalligraphyPen),
                _ => None,
            })
            .ok_or_else(|| {
                let known: Vec<String> = ToolId::all()
                    .iter()
                    .map(|id| id.label().to_lowercase().replace(' ', "-"))
                    .collect();
                format!("unknown tool '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// ============================================================================
// BRUSH: intensity mask blended toward the active or background color
// ============================================================================

#[derive(Clone, Debug)]
pub struct Brush {
    mask: Mask,
    uses_luminance: bool,
}

impl Brush {
    pub fn from_mask(mask: Mask, uses_luminance: bool) -> Self {
        Self { mask, uses_luminance }
    }

    pub fn circle(diameter: usize, center: f64, outer: f64, uses_luminance: bool) -> Self {
        Self::from_mask(Mask::circle(diameter, center, outer), uses_luminance)
    }

    pub fn rectangle(width: usize, height: usize, intensity: f64, uses_luminance: bool) -> Self {
        Self::from_mask(Mask::rectangle(width, height, intensity), uses_luminance)
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn uses_luminance(&self) -> bool {
        self.uses_luminance
    }

    /// Positive intensity paints toward `active`; zero or negative intensity
    /// erases toward the canvas background by its magnitude.
    pub fn apply_click(&self, canvas: &mut Canvas, x: i32, y: i32, active: ColorData) {
        let background = canvas.background_color();
        for (&cell, cx, cy) in self.mask.footprint(x, y) {
            if !canvas.is_valid_pixel(cx, cy) {
                continue;
            }
            let existing = canvas.get_valid_pixel(cx, cy);
            let mut intensity = cell as f32;
            if self.uses_luminance {
                intensity *= existing.luminance();
            }
            let blended = if intensity > 0.0 {
                existing.lerp(active, intensity)
            } else {
                existing.lerp(background, intensity.abs())
            };
            canvas.set_valid_pixel(cx, cy, blended);
        }
    }
}

// ============================================================================
// STAMPER: absolute-color mask blended with one uniform intensity
// ============================================================================

#[derive(Clone, Debug)]
pub struct Stamper {
    mask: Option<StampMask>,
    intensity: f32,
}

impl Stamper {
    /// A stamper with no image; clicks do nothing until a mask is set.
    pub fn empty(intensity: f32) -> Self {
        Self { mask: None, intensity }
    }

    pub fn with_mask(mask: StampMask, intensity: f32) -> Self {
        Self { mask: Some(mask), intensity }
    }

    pub fn mask(&self) -> Option<&StampMask> {
        self.mask.as_ref()
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn set_mask(&mut self, mask: StampMask) {
        self.mask = Some(mask);
    }

    /// Use a whole canvas as the stamp image.
    pub fn set_buffer_mask(&mut self, source: &Canvas) {
        self.mask = Some(StampMask::from_canvas(source));
    }

    /// Load an ASCII raster description. On a malformed file the previous
    /// mask is kept and the error is returned.
    pub fn set_raster_mask(
        &mut self,
        path: &Path,
        width: usize,
        height: usize,
        alpha: f32,
    ) -> Result<(), RasterError> {
        match StampMask::from_raster_file(path, width, height, alpha) {
            Ok(mask) => {
                self.mask = Some(mask);
                Ok(())
            }
            Err(e) => {
                log_err!("stamp description '{}' rejected: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Transparent cells are skipped; the rest blend toward the stamp color.
    pub fn apply_click(&self, canvas: &mut Canvas, x: i32, y: i32) {
        let Some(mask) = &self.mask else {
            log_warn!("stamp image has not been set");
            return;
        };
        for (&color, cx, cy) in mask.footprint(x, y) {
            if color.alpha <= 0.0 || !canvas.is_valid_pixel(cx, cy) {
                continue;
            }
            let existing = canvas.get_valid_pixel(cx, cy);
            canvas.set_valid_pixel(cx, cy, existing.lerp(color, self.intensity));
        }
    }
}

// ============================================================================
// BLUR TOOL: spatially varying blur radius
// ============================================================================

#[derive(Clone, Debug)]
pub struct BlurTool {
    mask: BlurToolMask,
}

impl BlurTool {
    pub fn new(diameter: usize) -> Self {
        Self { mask: BlurToolMask::new(diameter) }
    }

    pub fn mask(&self) -> &BlurToolMask {
        &self.mask
    }

    /// Each covered pixel is convolved with the kernel its selector names,
    /// reading from a copy frozen before the first write.
    pub fn apply_click(&mut self, canvas: &mut Canvas, x: i32, y: i32) {
        let frozen = canvas.copy();
        let half = (self.mask.size() / 2) as i32;
        let size = self.mask.size();
        for row in 0..size {
            for col in 0..size {
                let cx = x + col as i32 - half;
                let cy = y + row as i32 - half;
                let selector = *self.mask.selectors().get(col, row);
                if selector == 0 || !canvas.is_valid_pixel(cx, cy) {
                    continue;
                }
                let blurred = self.mask.kernel_for(selector).apply(&frozen, cx, cy, 0.0);
                canvas.set_valid_pixel(cx, cy, blurred);
            }
        }
    }
}

// ============================================================================
// TOOL: closed set of variants
// ============================================================================

#[derive(Clone, Debug)]
pub enum Tool {
    Brush(Brush),
    Stamper(Stamper),
    Blur(BlurTool),
}

impl Tool {
    pub fn apply_click(&mut self, canvas: &mut Canvas, x: i32, y: i32, active: ColorData) {
        match self {
            Tool::Brush(brush) => brush.apply_click(canvas, x, y, active),
            Tool::Stamper(stamper) => stamper.apply_click(canvas, x, y),
            Tool::Blur(blur) => blur.apply_click(canvas, x, y),
        }
    }

    /// Click at every step of the line from (x1, y1) to (x2, y2), excluding
    /// the start point, which the caller has already applied.
    pub fn apply_dragged(
        &mut self,
        canvas: &mut Canvas,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        active: ColorData,
    ) {
        for (x, y) in drag_points(x1, y1, x2, y2) {
            self.apply_click(canvas, x, y, active);
        }
    }
}

/// DDA stepping: one point per integer step along the axis with the larger
/// delta, the minor coordinate interpolated and truncated toward zero.
pub fn drag_points(x1: i32, y1: i32, x2: i32, y2: i32) -> Vec<(i32, i32)> {
    let dx = x2 - x1;
    let dy = y2 - y1;
    if dx.abs() > dy.abs() {
        let slope = dy as f64 / dx as f64;
        let step = dx.signum();
        (1..=dx.abs())
            .map(|shift| {
                let s = shift * step;
                (x1 + s, (y1 as f64 + s as f64 * slope) as i32)
            })
            .collect()
    } else if dy != 0 {
        let slope = dx as f64 / dy as f64;
        let step = dy.signum();
        (1..=dy.abs())
            .map(|shift| {
                let s = shift * step;
                ((x1 as f64 + s as f64 * slope) as i32, y1 + s)
            })
            .collect()
    } else {
        Vec::new()
    }
}

// ============================================================================
// TOOL BELT: registry keyed by ToolId
// ============================================================================

pub struct ToolBelt {
    tools: HashMap<ToolId, Tool>,
    active_tool: ToolId,
    active_color: ColorData,
    stamp_dir: PathBuf,
}

impl ToolBelt {
    /// The default belt, looking for built-in stamps under `stamps/`.
    pub fn new(active_color: ColorData) -> Self {
        Self::with_stamp_dir(active_color, "stamps")
    }

    pub fn with_stamp_dir(active_color: ColorData, stamp_dir: impl Into<PathBuf>) -> Self {
        let stamp_dir = stamp_dir.into();
        let mut tools = HashMap::new();
        tools.insert(ToolId::Pen, Tool::Brush(Brush::circle(3, 1.0, 1.0, false)));
        tools.insert(ToolId::Eraser, Tool::Brush(Brush::circle(21, -1.0, -1.0, false)));
        tools.insert(ToolId::SprayCan, Tool::Brush(Brush::circle(41, 0.2, 0.0, false)));
        tools.insert(ToolId::CalligraphyPen, Tool::Brush(Brush::rectangle(5, 15, 1.0, false)));
        tools.insert(ToolId::Highlighter, Tool::Brush(Brush::rectangle(5, 15, 0.4, true)));
        tools.insert(ToolId::Stamp, Tool::Stamper(Stamper::empty(1.0)));
        tools.insert(ToolId::Blur, Tool::Blur(BlurTool::new(41)));

        let mut stamper = Stamper::empty(0.5);
        let stamp_path = stamp_dir.join(format!("{}.{}", DEFAULT_STAMP_NAME, STAMP_EXTENSION));
        // A malformed built-in stamp leaves the tool empty; it logs on click.
        let _ = stamper.set_raster_mask(&stamp_path, 200, 150, 1.0);
        tools.insert(ToolId::Stamper, Tool::Stamper(stamper));

        Self { tools, active_tool: ToolId::default(), active_color, stamp_dir }
    }

    pub fn set_active_tool(&mut self, id: ToolId) {
        log_info!("active tool: {}", id.label());
        self.active_tool = id;
    }

    pub fn active_tool(&self) -> ToolId {
        self.active_tool
    }

    pub fn set_active_color(&mut self, color: ColorData) {
        self.active_color = color;
    }

    pub fn active_color(&self) -> ColorData {
        self.active_color
    }

    pub fn stamp_dir(&self) -> &Path {
        &self.stamp_dir
    }

    pub fn tool(&self, id: ToolId) -> Option<&Tool> {
        self.tools.get(&id)
    }

    pub fn tool_mut(&mut self, id: ToolId) -> Option<&mut Tool> {
        self.tools.get_mut(&id)
    }

    /// Replace the tool registered under `id`.
    pub fn register(&mut self, id: ToolId, tool: Tool) {
        self.tools.insert(id, tool);
    }

    pub fn apply_click(&mut self, canvas: &mut Canvas, x: i32, y: i32) {
        let active = self.active_color;
        if let Some(tool) = self.tools.get_mut(&self.active_tool) {
            tool.apply_click(canvas, x, y, active);
        }
    }

    pub fn apply_dragged(&mut self, canvas: &mut Canvas, x1: i32, y1: i32, x2: i32, y2: i32) {
        let active = self.active_color;
        if let Some(tool) = self.tools.get_mut(&self.active_tool) {
            tool.apply_dragged(canvas, x1, y1, x2, y2, active);
        }
    }

    /// Give the `Stamp` tool a loaded image.
    pub fn load_stamp_from_canvas(&mut self, source: &Canvas) {
        if let Some(Tool::Stamper(stamper)) = self.tools.get_mut(&ToolId::Stamp) {
            stamper.set_buffer_mask(source);
            log_info!("stamp loaded from {}x{} image", source.width(), source.height());
        }
    }

    /// Load a named ASCII raster from the stamp directory into `id`'s stamper.
    pub fn load_stamp_from_raster(
        &mut self,
        id: ToolId,
        name: &str,
        width: usize,
        height: usize,
        alpha: f32,
    ) -> Result<(), RasterError> {
        let path = self.stamp_dir.join(format!("{}.{}", name, STAMP_EXTENSION));
        match self.tools.get_mut(&id) {
            Some(Tool::Stamper(stamper)) => stamper.set_raster_mask(&path, width, height, alpha),
            _ => Err(RasterError::Malformed(format!("{} is not a stamp tool", id.label()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_belt() -> ToolBelt {
        let dir = std::env::temp_dir().join("pixelsmith_tools_no_stamps");
        ToolBelt::with_stamp_dir(ColorData::BLACK, dir)
    }

    #[test]
    fn rectangle_brush_paints_center_block() {
        let mut canvas = Canvas::new(5, 5, ColorData::WHITE);
        let brush = Brush::rectangle(3, 3, 1.0, false);
        brush.apply_click(&mut canvas, 2, 2, ColorData::BLACK);
        for y in 0..5 {
            for x in 0..5 {
                let inner = (1..=3).contains(&x) && (1..=3).contains(&y);
                let expected = if inner { ColorData::BLACK } else { ColorData::WHITE };
                assert_eq!(canvas.get_pixel(x, y), expected, "pixel {},{}", x, y);
            }
        }
    }

    #[test]
    fn negative_intensity_erases_to_background() {
        let bg = ColorData::rgb(1.0, 1.0, 0.95);
        let mut canvas = Canvas::new(5, 5, bg);
        canvas.fill(ColorData::BLACK);
        Brush::rectangle(1, 1, -1.0, false).apply_click(&mut canvas, 2, 2, ColorData::BLACK);
        assert_eq!(canvas.get_pixel(2, 2), bg);
        assert_eq!(canvas.get_pixel(1, 2), ColorData::BLACK);
    }

    #[test]
    fn partial_intensity_blends() {
        let mut canvas = Canvas::new(1, 1, ColorData::WHITE);
        Brush::rectangle(1, 1, 0.25, false).apply_click(&mut canvas, 0, 0, ColorData::BLACK);
        let c = canvas.get_pixel(0, 0);
        assert!((c.red - 0.75).abs() < 1e-6);
        assert_eq!(c.alpha, 1.0);
    }

    #[test]
    fn highlighter_scales_by_luminance() {
        let mut canvas = Canvas::new(1, 1, ColorData::gray(0.5));
        Brush::rectangle(1, 1, 0.4, true).apply_click(&mut canvas, 0, 0, ColorData::BLACK);
        // Effective intensity 0.4 * luminance(0.5 gray) = 0.2.
        let c = canvas.get_pixel(0, 0);
        assert!((c.red - 0.4).abs() < 1e-4, "got {}", c.red);
    }

    #[test]
    fn brush_clips_at_canvas_edge() {
        let mut canvas = Canvas::new(3, 3, ColorData::WHITE);
        Brush::rectangle(3, 3, 1.0, false).apply_click(&mut canvas, 0, 0, ColorData::BLACK);
        assert_eq!(canvas.get_pixel(0, 0), ColorData::BLACK);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::BLACK);
        assert_eq!(canvas.get_pixel(2, 2), ColorData::WHITE);
    }

    #[test]
    fn stamp_skips_transparent_cells() {
        let source = Canvas::new(1, 1, ColorData::rgb(1.0, 0.0, 0.0));
        let mut stamp = Stamper::empty(1.0);
        stamp.set_buffer_mask(&source);
        let mut canvas = Canvas::new(3, 3, ColorData::WHITE);
        stamp.apply_click(&mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::rgb(1.0, 0.0, 0.0));

        let mut wide = Canvas::new(3, 1, ColorData::TRANSPARENT);
        wide.set_pixel(1, 0, ColorData::rgb(0.0, 0.0, 1.0));
        stamp.set_buffer_mask(&wide);
        stamp.apply_click(&mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(0, 1), ColorData::WHITE);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::rgb(0.0, 0.0, 1.0));
        assert_eq!(canvas.get_pixel(1, 0), ColorData::WHITE);
    }

    #[test]
    fn stamp_intensity_blends_uniformly() {
        let source = Canvas::new(1, 1, ColorData::BLACK);
        let mut stamper = Stamper::empty(0.5);
        stamper.set_buffer_mask(&source);
        let mut canvas = Canvas::new(1, 1, ColorData::WHITE);
        stamper.apply_click(&mut canvas, 0, 0);
        assert_eq!(canvas.get_pixel(0, 0), ColorData::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn empty_stamper_is_a_noop() {
        let mut canvas = Canvas::new(2, 2, ColorData::WHITE);
        Stamper::empty(1.0).apply_click(&mut canvas, 1, 1);
        assert!(canvas.data().iter().all(|&c| c == ColorData::WHITE));
    }

    #[test]
    fn malformed_raster_keeps_previous_stamp() {
        let path = std::env::temp_dir().join("pixelsmith_bad_stamp.ppm");
        std::fs::write(&path, "P6\n1 1\n255\n0 0 0\n").unwrap();
        let mut stamper = Stamper::empty(1.0);
        stamper.set_buffer_mask(&Canvas::new(1, 1, ColorData::BLACK));
        let before = stamper.mask().cloned();
        assert!(stamper.set_raster_mask(&path, 10, 10, 1.0).is_err());
        assert_eq!(stamper.mask().cloned(), before);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn oversized_raster_header_keeps_previous_stamp() {
        let path = std::env::temp_dir().join("pixelsmith_huge_stamp.ppm");
        std::fs::write(&path, "P3\n4294967296 4294967296\n255\n0 0 0\n").unwrap();
        let mut stamper = Stamper::empty(1.0);
        stamper.set_buffer_mask(&Canvas::new(3, 3, ColorData::rgb(0.0, 1.0, 0.0)));
        let before = stamper.mask().cloned();
        assert!(matches!(
            stamper.set_raster_mask(&path, 10, 10, 1.0),
            Err(RasterError::Malformed(_))
        ));
        assert_eq!(stamper.mask().cloned(), before);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn builtin_stamp_loads_by_name() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("stamps");
        let mut belt = ToolBelt::with_stamp_dir(ColorData::BLACK, dir);
        belt.load_stamp_from_raster(ToolId::Stamp, DEFAULT_STAMP_NAME, 200, 150, 1.0).unwrap();
        let Some(Tool::Stamper(stamper)) = belt.tool(ToolId::Stamp) else {
            panic!("stamp tool missing");
        };
        let mask = stamper.mask().unwrap();
        assert_eq!(mask.size(), 201);
        // 151 rows centered in 201 leave 25 transparent rows above.
        assert!(mask.is_transparent_at(100, 24));
        let rgb = |r: f32, g: f32, b: f32| ColorData::new(r / 255.0, g / 255.0, b / 255.0, 1.0);
        assert_eq!(*mask.get(0, 25), rgb(250.0, 240.0, 242.0));
        assert_eq!(*mask.get(100, 100), rgb(212.0, 63.0, 125.0));
    }

    #[test]
    fn blur_tool_leaves_flat_canvas_unchanged() {
        let flat = ColorData::rgb(0.3, 0.6, 0.9);
        let mut canvas = Canvas::new(30, 30, flat);
        let mut blur = BlurTool::new(9);
        blur.apply_click(&mut canvas, 15, 15);
        for c in canvas.data() {
            assert!((c.red - flat.red).abs() < 1e-5 && (c.blue - flat.blue).abs() < 1e-5);
        }
        assert!(blur.mask().cached_kernels() > 0);
    }

    #[test]
    fn blur_tool_softens_a_spike() {
        let mut canvas = Canvas::new(11, 11, ColorData::BLACK);
        canvas.set_pixel(5, 5, ColorData::WHITE);
        BlurTool::new(9).apply_click(&mut canvas, 5, 5);
        let center = canvas.get_pixel(5, 5);
        assert!(center.red < 1.0 && center.red > 0.0);
        assert!(canvas.get_pixel(5, 4).red > 0.0);
    }

    #[test]
    fn drag_steps_along_dominant_axis() {
        assert_eq!(drag_points(0, 0, 4, 2), vec![(1, 0), (2, 1), (3, 1), (4, 2)]);
        assert_eq!(drag_points(0, 0, 2, 4), vec![(0, 1), (1, 2), (1, 3), (2, 4)]);
        assert_eq!(drag_points(5, 5, 2, 5), vec![(4, 5), (3, 5), (2, 5)]);
        assert!(drag_points(3, 3, 3, 3).is_empty());
    }

    #[test]
    fn dragged_pen_draws_a_line() {
        let mut canvas = Canvas::new(12, 5, ColorData::WHITE);
        let mut belt = test_belt();
        belt.apply_click(&mut canvas, 1, 2);
        belt.apply_dragged(&mut canvas, 1, 2, 10, 2);
        for x in 1..=10 {
            assert_eq!(canvas.get_pixel(x, 2), ColorData::BLACK, "x = {}", x);
        }
        assert_eq!(canvas.get_pixel(11, 0), ColorData::WHITE);
    }

    #[test]
    fn default_belt_registers_every_tool() {
        let belt = test_belt();
        for id in ToolId::all() {
            assert!(belt.tool(*id).is_some(), "{:?}", id);
        }
        assert!(matches!(belt.tool(ToolId::Highlighter), Some(Tool::Brush(b)) if b.uses_luminance()));
        assert!(matches!(belt.tool(ToolId::Stamp), Some(Tool::Stamper(s)) if s.mask().is_none()));
        // No stamp directory: the built-in stamper falls back to stripes.
        match belt.tool(ToolId::Stamper) {
            Some(Tool::Stamper(s)) => assert_eq!(s.mask(), Some(&StampMask::checkerboard(200, 150))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn belt_switches_tools_and_colors() {
        let mut belt = test_belt();
        let mut canvas = Canvas::new(3, 3, ColorData::WHITE);
        belt.set_active_color(ColorData::rgb(0.0, 1.0, 0.0));
        belt.apply_click(&mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::rgb(0.0, 1.0, 0.0));

        belt.set_active_tool(ToolId::Eraser);
        assert_eq!(belt.active_tool(), ToolId::Eraser);
        belt.apply_click(&mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::WHITE);
    }

    #[test]
    fn load_stamp_from_canvas_targets_stamp_tool() {
        let mut belt = test_belt();
        belt.load_stamp_from_canvas(&Canvas::new(2, 2, ColorData::BLACK));
        belt.set_active_tool(ToolId::Stamp);
        let mut canvas = Canvas::new(4, 4, ColorData::WHITE);
        belt.apply_click(&mut canvas, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1), ColorData::BLACK);
        assert!(belt.load_stamp_from_raster(ToolId::Pen, "x", 4, 4, 1.0).is_err());
    }

    #[test]
    fn tool_ids_parse_from_labels() {
        assert_eq!("pen".parse::<ToolId>(), Ok(ToolId::Pen));
        assert_eq!("Spray Can".parse::<ToolId>(), Ok(ToolId::SprayCan));
        assert_eq!("calligraphy-pen".parse::<ToolId>(), Ok(ToolId::CalligraphyPen));
        assert_eq!("spray".parse::<ToolId>(), Ok(ToolId::SprayCan));
        assert!("chisel".parse::<ToolId>().is_err());
    }
}
