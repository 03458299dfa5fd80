//! Pixelsmith: a raster paint engine over a float RGBA canvas.
//!
//! Brushes, stamps and the variable-radius blur tool live in
//! [`components::tools`]; whole-image filters in [`ops::filters`]; snapshot
//! undo/redo in [`components::history`]. [`project::Document`] ties them
//! together the way an editor front end drives them.
#![allow(clippy::too_many_arguments)]

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod color;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;

pub use canvas::{Canvas, CanvasError};
pub use color::ColorData;
pub use components::history::{HistoryError, HistoryManager};
pub use components::tools::{Tool, ToolBelt, ToolId};
pub use ops::filters::{ConvolutionKernel, Filter, KernelFamily};
pub use ops::masks::{BlurToolMask, Mask, StampMask};
pub use project::Document;
pub use settings::Settings;
