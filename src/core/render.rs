use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{DiagramFile, Theme};

/// Image format a result is delivered in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Per-render parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub theme: Theme,
    /// Pure function of (path, content), see [`crate::cache::generate_key`].
    pub cache_key: String,
}

impl RenderOptions {
    pub fn new(theme: Theme, cache_key: impl Into<String>) -> Self {
        Self {
            theme,
            cache_key: cache_key.into(),
        }
    }

    pub fn for_file(file: &DiagramFile, theme: Theme) -> Self {
        Self::new(theme, file.cache_key())
    }
}

/// Outcome of one render attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Svg(Arc<str>),
    Png(Arc<[u8]>),
    Error {
        message: String,
        /// Source line reported by the compiler, when it gave one.
        line: Option<u32>,
    },
}

impl RenderResult {
    pub fn svg(markup: impl Into<Arc<str>>) -> Self {
        Self::Svg(markup.into())
    }

    pub fn png(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Png(bytes.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            line: None,
        }
    }

    pub fn error_at(message: impl Into<String>, line: Option<u32>) -> Self {
        Self::Error {
            message: message.into(),
            line,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Image format, `None` for errors.
    pub fn format(&self) -> Option<ImageFormat> {
        match self {
            Self::Svg(_) => Some(ImageFormat::Svg),
            Self::Png(_) => Some(ImageFormat::Png),
            Self::Error { .. } => None,
        }
    }

    /// Tag name as used in logs: `svg`, `png` or `error`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Svg(_) => "svg",
            Self::Png(_) => "png",
            Self::Error { .. } => "error",
        }
    }

    /// Human readable error text including the line, if any.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Error {
                message,
                line: Some(line),
            } if !message.contains(&line.to_string()) => {
                Some(format!("{message} (line {line})"))
            }
            Self::Error { message, .. } => Some(message.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_tags() {
        assert_eq!(RenderResult::svg("<svg/>").kind(), "svg");
        assert_eq!(RenderResult::png(vec![0x89, b'P']).format(), Some(ImageFormat::Png));
        assert!(RenderResult::error("boom").is_error());
        assert_eq!(RenderResult::error("boom").format(), None);
    }

    #[test]
    fn test_error_text_appends_missing_line() {
        let err = RenderResult::error_at("unexpected token", Some(4));
        assert_eq!(err.error_text().unwrap(), "unexpected token (line 4)");

        let err = RenderResult::error_at("Parse error on line 4", Some(4));
        assert_eq!(err.error_text().unwrap(), "Parse error on line 4");

        assert!(RenderResult::svg("<svg/>").error_text().is_none());
    }

    #[test]
    fn test_options_key_tracks_content() {
        let file = DiagramFile::new("a.mmd", "graph TD;A-->B");
        let options = RenderOptions::for_file(&file, Theme::Dark);
        assert_eq!(options.cache_key, file.cache_key());
        assert_eq!(options.theme, Theme::Dark);
    }
}
