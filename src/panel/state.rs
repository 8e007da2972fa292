use std::fmt;

use crate::core::{DiagramFile, Theme};

/// Identifies one open preview panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel-{}", self.0)
    }
}

/// Lifecycle of a panel.
///
/// ```text
/// Idle ──open──> Resolving ──unsupported──> Unsupported
///                    │
///                    └──> Rendering ──> Displayed ──edit──> Resolving
///                             │
///                             └──> Error ──edit──> Resolving
/// ```
///
/// Closing returns to `Idle` from any state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Idle,
    Resolving,
    /// Terminal until a different file is opened.
    Unsupported,
    Rendering,
    Displayed,
    Error,
}

impl PanelState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Unsupported => "unsupported",
            Self::Rendering => "rendering",
            Self::Displayed => "displayed",
            Self::Error => "error",
        }
    }

    /// Whether the last render cycle finished (with an image or an error).
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Displayed | Self::Error | Self::Unsupported)
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Commands into a panel.
#[derive(Debug)]
pub enum PanelCmd {
    /// Bind a document and render it right away.
    Open(DiagramFile),
    /// New content for the bound document (debounced).
    Edit(String),
    Theme(Theme),
    Close,
}
