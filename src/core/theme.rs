use std::fmt;

use serde::{Deserialize, Serialize};

/// Application color theme for rendered diagrams.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Theme identifier understood by the diagram engines.
    ///
    /// Mermaid and PlantUML both call their light palette `default`.
    pub fn engine_theme(self) -> &'static str {
        match self {
            Self::Light => "default",
            Self::Dark => "dark",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_theme_mapping() {
        assert_eq!(Theme::Light.engine_theme(), "default");
        assert_eq!(Theme::Dark.engine_theme(), "dark");
    }

    #[test]
    fn test_theme_serde() {
        let json = serde_json::to_string(&Theme::Dark).unwrap();
        assert_eq!(json, r#""dark""#);
        let theme: Theme = serde_json::from_str(r#""light""#).unwrap();
        assert_eq!(theme, Theme::Light);
    }
}
