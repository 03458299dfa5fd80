use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::canvas::Canvas;
use crate::color::ColorData;
use crate::components::history::{HistoryError, HistoryManager};
use crate::components::tools::ToolBelt;
use crate::io::{self, DocumentError};
use crate::ops::filters::Filter;
use crate::settings::Settings;
use crate::{log_err, log_info};

/// Single open document: the canvas plus everything that edits it.
pub struct Document {
    pub id: Uuid,
    pub canvas: Canvas,
    pub history: HistoryManager,
    pub tools: ToolBelt,
    /// `None` for unsaved/untitled files.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled")
    pub name: String,

    /// Last point of the stroke in progress.
    stroke_anchor: Option<(i32, i32)>,
}

impl Document {
    pub fn new(width: u32, height: u32, background: ColorData, history_limit: usize) -> Self {
        Self::with_tools(
            Canvas::new(width, height, background),
            HistoryManager::new(history_limit),
            ToolBelt::new(ColorData::BLACK),
        )
    }

    /// Blank canvas sized and colored from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_tools(
            Canvas::new(settings.default_width, settings.default_height, settings.background_color()),
            HistoryManager::new(settings.history_limit)
                .with_memory_limit(settings.history_memory_bytes()),
            ToolBelt::with_stamp_dir(ColorData::BLACK, &settings.stamp_dir),
        )
    }

    fn with_tools(canvas: Canvas, mut history: HistoryManager, tools: ToolBelt) -> Self {
        history.register_labeled(canvas.get_all_pixels(), "New Canvas");
        Self {
            id: Uuid::new_v4(),
            canvas,
            history,
            tools,
            path: None,
            is_dirty: false,
            name: "Untitled".to_string(),
            stroke_anchor: None,
        }
    }

    /// Open an image or native document, composited over the configured background.
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, DocumentError> {
        let canvas = io::open_path(path, settings.background_color())?;
        let mut doc = Self::from_settings(settings);
        doc.replace_canvas(canvas);
        doc.path = Some(path.to_path_buf());
        doc.update_name_from_path();
        log_info!("opened {} ({}x{})", path.display(), doc.canvas.width(), doc.canvas.height());
        Ok(doc)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<(), DocumentError> {
        io::save_path(&self.canvas, path)?;
        self.path = Some(path.to_path_buf());
        self.update_name_from_path();
        self.mark_clean();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Press: apply the active tool once at (x, y).
    pub fn begin_stroke(&mut self, x: i32, y: i32) {
        self.tools.apply_click(&mut self.canvas, x, y);
        self.stroke_anchor = Some((x, y));
    }

    /// Drag: apply along the line from the previous point. A drag without a
    /// press starts a stroke here.
    pub fn stroke_to(&mut self, x: i32, y: i32) {
        match self.stroke_anchor {
            Some((px, py)) => {
                self.tools.apply_dragged(&mut self.canvas, px, py, x, y);
                self.stroke_anchor = Some((x, y));
            }
            None => self.begin_stroke(x, y),
        }
    }

    /// Release: the stroke becomes one undoable edit.
    pub fn end_stroke(&mut self) {
        if self.stroke_anchor.take().is_some() {
            let label = self.tools.active_tool().label();
            self.history.register_labeled(self.canvas.get_all_pixels(), label);
            self.mark_dirty();
        }
    }

    pub fn click(&mut self, x: i32, y: i32) {
        self.begin_stroke(x, y);
        self.end_stroke();
    }

    pub fn apply_filter(&mut self, filter: &Filter) {
        filter.apply(&mut self.canvas);
        self.history.register_labeled(self.canvas.get_all_pixels(), filter.label());
        self.mark_dirty();
    }

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.undo()?;
        restore(&mut self.canvas, snapshot);
        self.mark_dirty();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.redo()?;
        restore(&mut self.canvas, snapshot);
        self.mark_dirty();
        Ok(())
    }

    /// Swap in a freshly loaded canvas; history restarts from it.
    pub fn replace_canvas(&mut self, canvas: Canvas) {
        self.stroke_anchor = None;
        self.canvas = canvas;
        self.history.clear_all();
        self.history.register_labeled(self.canvas.get_all_pixels(), "Open");
        self.mark_clean();
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn update_name_from_path(&mut self) {
        if let Some(ref path) = self.path {
            self.name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
        }
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

fn restore(canvas: &mut Canvas, snapshot: &[ColorData]) {
    if let Err(e) = canvas.set_all_pixels(snapshot) {
        log_err!("history snapshot rejected: {}", e);
    }
}
