//! External diagram compilers.
//!
//! Each compiler wraps one command-line tool behind [`DiagramCompiler`]:
//!
//! | Compiler        | Tool                | Invocation                          |
//! |-----------------|---------------------|-------------------------------------|
//! | [`MermaidCli`]  | `mmdc`              | temp files, `-i in.mmd -o out.svg`  |
//! | [`PlantUml`]    | `plantuml` / `java` | `-pipe` over stdin/stdout           |
//! | [`Structurizr`] | `structurizr-cli`   | `export -format plantuml`, then PlantUML |
//!
//! Compilers are blocking; callers run them on a blocking thread.

mod line;
mod mermaid;
mod plantuml;
mod probe;
mod structurizr;

use std::io;

use thiserror::Error;

use crate::core::{RenderResult, Theme};

pub use line::extract_line;
pub use mermaid::MermaidCli;
pub use plantuml::PlantUml;
pub use probe::probe_command;
pub use structurizr::Structurizr;

/// Ready image produced by a compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledImage {
    Svg(String),
    Png(Vec<u8>),
}

impl From<CompiledImage> for RenderResult {
    fn from(image: CompiledImage) -> Self {
        match image {
            CompiledImage::Svg(markup) => RenderResult::svg(markup),
            CompiledImage::Png(bytes) => RenderResult::png(bytes),
        }
    }
}

/// Compiler failures.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The tool is not installed or not on PATH.
    #[error("`{tool}` is not available: {hint}")]
    Unavailable { tool: String, hint: String },

    /// The tool rejected the diagram source.
    #[error("{message}")]
    Syntax { message: String, line: Option<u32> },

    #[error("failed to run `{tool}`: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` produced no output")]
    EmptyOutput { tool: String },
}

impl CompileError {
    /// Syntax error with the line number pulled out of the message.
    pub fn syntax(message: impl Into<String>) -> Self {
        let message = message.into();
        let line = extract_line(&message);
        Self::Syntax { message, line }
    }

    pub fn io(tool: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            tool: tool.into(),
            source,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Syntax { line, .. } => *line,
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<CompileError> for RenderResult {
    fn from(err: CompileError) -> Self {
        RenderResult::error_at(err.to_string(), err.line())
    }
}

/// One external diagram compiler.
pub trait DiagramCompiler: Send + Sync {
    /// Short tool name for logs.
    fn name(&self) -> &'static str;

    /// Check that the tool can be invoked at all.
    fn probe(&self) -> Result<(), CompileError>;

    /// Compile diagram source into an image.
    fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError>;
}
