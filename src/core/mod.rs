//! Core types - pure data shared by every layer of the preview pipeline.
//!
//! ```text
//! DiagramFile + Theme ──> RenderOptions ──> Renderer ──> RenderResult
//! ```

mod file;
mod render;
mod theme;

pub use file::DiagramFile;
pub use render::{ImageFormat, RenderOptions, RenderResult};
pub use theme::Theme;
