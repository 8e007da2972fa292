//! Where the surface puts things: the insertion step of the display.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::ImageFormat;

/// Failures of the insertion step.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Display target of a surface.
pub trait Canvas: Send {
    /// Insert already-rendered SVG markup.
    fn insert_svg(&mut self, markup: &str) -> Result<(), CanvasError>;

    /// Show a binary image.
    fn show_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<(), CanvasError>;

    /// Replace the display with an error state.
    fn show_error(&mut self, message: &str);
}

/// Headless canvas that writes each displayed image to disk.
///
/// The extension of `output` follows the displayed format, so `-o flow.svg`
/// becomes `flow.png` for PNG results.
#[derive(Debug, Clone)]
pub struct FileCanvas {
    output: PathBuf,
}

impl FileCanvas {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Output path for a given format.
    pub fn target(&self, format: ImageFormat) -> PathBuf {
        self.output.with_extension(format.extension())
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), CanvasError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CanvasError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, bytes).map_err(|source| CanvasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        crate::logger::status_success(&format!("wrote {}", path.display()));
        Ok(())
    }
}

impl Canvas for FileCanvas {
    fn insert_svg(&mut self, markup: &str) -> Result<(), CanvasError> {
        validate_svg(markup)?;
        self.write(&self.target(ImageFormat::Svg), markup.as_bytes())
    }

    fn show_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<(), CanvasError> {
        self.write(&self.target(format), bytes)
    }

    fn show_error(&mut self, message: &str) {
        crate::logger::status_error("render failed", message);
    }
}

/// Parse markup with usvg; only well-formed SVG passes.
pub fn validate_svg(markup: &str) -> Result<(), CanvasError> {
    usvg::Tree::from_data(markup.as_bytes(), &usvg::Options::default())
        .map(|_| ())
        .map_err(|e| CanvasError::Markup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_svg() {
        assert!(validate_svg(r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="5" height="5"/></svg>"#).is_ok());
        assert!(validate_svg("<svg><rect></svg>").is_err());
        assert!(validate_svg("graph TD; A-->B").is_err());
    }

    #[test]
    fn test_file_canvas_writes_by_format() {
        let dir = TempDir::new().unwrap();
        let mut canvas = FileCanvas::new(dir.path().join("out/flow.svg"));

        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        canvas.insert_svg(svg).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("out/flow.svg")).unwrap(), svg);

        canvas.show_image(&[0x89, b'P', b'N', b'G'], ImageFormat::Png).unwrap();
        assert!(dir.path().join("out/flow.png").exists());
    }

    #[test]
    fn test_file_canvas_rejects_malformed_markup() {
        let dir = TempDir::new().unwrap();
        let mut canvas = FileCanvas::new(dir.path().join("flow.svg"));
        let err = canvas.insert_svg("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, CanvasError::Markup(_)));
        assert!(!dir.path().join("flow.svg").exists());
    }
}
