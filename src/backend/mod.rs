//! Backend selection - which rendering family handles a file extension.
//!
//! The table below is the single source of truth, used both to pick an
//! adapter and to report "what will be rendered" (`diagram-preview backends`).
//!
//! | Extension            | Backend  | Diagram     |
//! |----------------------|----------|-------------|
//! | `.mmd`, `.mermaid`   | surface  | mermaid     |
//! | `.puml`              | external | plantuml    |
//! | `.dsl`               | external | structurizr |

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// How a diagram family gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Rendered inside the display surface by its own engine instance.
    Surface,
    /// Rendered up front by an external compiler process.
    External,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::External => "external",
        }
    }
}

/// Logical diagram language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramType {
    Mermaid,
    PlantUml,
    Structurizr,
}

impl DiagramType {
    pub const ALL: [Self; 3] = [Self::Mermaid, Self::PlantUml, Self::Structurizr];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::PlantUml => "plantuml",
            Self::Structurizr => "structurizr",
        }
    }

    /// File extensions routed to this diagram type.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Mermaid => &["mmd", "mermaid"],
            Self::PlantUml => &["puml"],
            Self::Structurizr => &["dsl"],
        }
    }

    /// Backend family this diagram type belongs to.
    pub fn backend(self) -> BackendKind {
        match self {
            Self::Mermaid => BackendKind::Surface,
            Self::PlantUml | Self::Structurizr => BackendKind::External,
        }
    }
}

/// Immutable routing entry for one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub diagram: DiagramType,
}

impl BackendDescriptor {
    const fn new(kind: BackendKind, diagram: DiagramType) -> Self {
        Self { kind, diagram }
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.diagram.name(), self.kind.name())
    }
}

const BACKENDS: &[(&str, BackendDescriptor)] = &[
    ("mmd", BackendDescriptor::new(BackendKind::Surface, DiagramType::Mermaid)),
    ("mermaid", BackendDescriptor::new(BackendKind::Surface, DiagramType::Mermaid)),
    ("puml", BackendDescriptor::new(BackendKind::External, DiagramType::PlantUml)),
    ("dsl", BackendDescriptor::new(BackendKind::External, DiagramType::Structurizr)),
];

/// The extension has no backend. A usage condition, not a render failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported file type `{}`; supported: {}", display_ext(.extension), supported_list())]
pub struct Unsupported {
    pub extension: String,
}

fn display_ext(ext: &str) -> String {
    if ext.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{ext}")
    }
}

fn supported_list() -> String {
    supported_extensions()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve an extension (with or without leading dot, any case).
pub fn resolve(extension: &str) -> Result<BackendDescriptor, Unsupported> {
    let ext = extension.strip_prefix('.').unwrap_or(extension);
    BACKENDS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, descriptor)| *descriptor)
        .ok_or_else(|| Unsupported {
            extension: ext.to_ascii_lowercase(),
        })
}

/// Resolve a file path by its extension.
pub fn resolve_path(path: &Path) -> Result<BackendDescriptor, Unsupported> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    resolve(ext)
}

/// All supported extensions, in table order.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    BACKENDS.iter().map(|(ext, _)| *ext)
}

/// The full routing table.
pub fn table() -> &'static [(&'static str, BackendDescriptor)] {
    BACKENDS
}
