//! Render collaborator seam
//!
//! The core only needs filled circles, stroked circles and dashed lines; any
//! backend implementing `Canvas` can draw a frame.

pub mod canvas;
pub mod frame;

pub use canvas::{Canvas, Color, CommandCanvas, DrawCommand, colors, css_color};
pub use frame::{CueLine, CueStyle, FrameView, cue_lines, draw_frame};
