//! In-surface diagram engine.
//!
//! Surfaces that receive raw source (Mermaid) own one engine instance and
//! render with it. The engine keeps its theme until re-initialized.

use crate::compiler::{CompiledImage, DiagramCompiler};
use crate::core::Theme;

/// Diagram renderer living inside a surface.
pub trait DiagramEngine: Send {
    /// (Re)initialize with a theme. Idempotent.
    fn initialize(&mut self, theme: Theme);

    /// Render source to SVG markup, or a human readable error.
    fn render(&mut self, source: &str) -> Result<String, String>;
}

/// Engine backed by an external compiler, e.g. Mermaid CLI for a headless surface.
pub struct CompilerEngine<C> {
    compiler: C,
    theme: Theme,
}

impl<C: DiagramCompiler> CompilerEngine<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            theme: Theme::default(),
        }
    }
}

impl<C: DiagramCompiler> DiagramEngine for CompilerEngine<C> {
    fn initialize(&mut self, theme: Theme) {
        crate::debug!("surface"; "{} engine theme: {}", self.compiler.name(), theme.engine_theme());
        self.theme = theme;
    }

    fn render(&mut self, source: &str) -> Result<String, String> {
        self.compiler.probe().map_err(|e| e.to_string())?;
        match self.compiler.compile(source, self.theme) {
            Ok(CompiledImage::Svg(svg)) => Ok(svg),
            Ok(CompiledImage::Png(_)) => Err(format!(
                "{} produced a raster image where SVG was expected",
                self.compiler.name()
            )),
            Err(e) => Err(e.to_string()),
        }
    }
}
