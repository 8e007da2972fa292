//! Preview configuration from `preview.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                         |
//! |-----------------|-------------------------------------------------|
//! | `[preview]`     | Theme, cache capacity, edit debounce window     |
//! | `[mermaid]`     | Mermaid CLI command and background              |
//! | `[plantuml]`    | PlantUML command and output format              |
//! | `[structurizr]` | Structurizr CLI command and output format       |
//!
//! Every field has a default, so a missing file means "all defaults".

mod error;
mod util;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CAPACITY;
use crate::core::{ImageFormat, Theme};
use crate::log;
use crate::panel::DEBOUNCE_MS;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use util::find_config_file;

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "preview.toml";

/// Longest accepted debounce window.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Root configuration structure representing preview.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Path the config was loaded from (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub preview: PreviewSection,
    pub mermaid: MermaidSection,
    pub plantuml: PlantUmlSection,
    pub structurizr: StructurizrSection,
}

/// `[preview]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSection {
    pub theme: Theme,
    /// Entries per adapter cache.
    pub cache_capacity: usize,
    /// Edit coalescing window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            cache_capacity: DEFAULT_CAPACITY,
            debounce_ms: DEBOUNCE_MS,
        }
    }
}

/// `[mermaid]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MermaidSection {
    pub command: Vec<String>,
    pub background: String,
}

impl Default for MermaidSection {
    fn default() -> Self {
        Self {
            command: vec!["mmdc".into()],
            background: "transparent".into(),
        }
    }
}

/// `[plantuml]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantUmlSection {
    /// e.g. `["java", "-jar", "/opt/plantuml.jar"]`
    pub command: Vec<String>,
    pub format: ImageFormat,
}

impl Default for PlantUmlSection {
    fn default() -> Self {
        Self {
            command: vec!["plantuml".into()],
            format: ImageFormat::Svg,
        }
    }
}

/// `[structurizr]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructurizrSection {
    pub command: Vec<String>,
    pub format: ImageFormat,
}

impl Default for StructurizrSection {
    fn default() -> Self {
        Self {
            command: vec!["structurizr-cli".into()],
            format: ImageFormat::Svg,
        }
    }
}

impl PreviewConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `preview.toml` is searched
    /// upward from the working directory and defaults apply if none is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => match find_config_file(Path::new(CONFIG_FILE)) {
                Some(path) => path,
                None => {
                    crate::debug!("config"; "no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let mut config = Self::from_path(&path)?;
        config.config_path = Some(path);
        Ok(config)
    }

    /// Read, parse and validate one file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        config.validate()?;
        crate::debug!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Check value ranges and commands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.preview.cache_capacity == 0 {
            diag.error("preview.cache_capacity", "must be at least 1");
        }
        if self.preview.debounce_ms > MAX_DEBOUNCE_MS {
            diag.error_with_hint(
                "preview.debounce_ms",
                format!("{} ms is longer than {MAX_DEBOUNCE_MS} ms", self.preview.debounce_ms),
                "values around 300 keep typing responsive",
            );
        }

        for (field, command) in [
            ("mermaid.command", &self.mermaid.command),
            ("plantuml.command", &self.plantuml.command),
            ("structurizr.command", &self.structurizr.command),
        ] {
            if command.first().is_none_or(|program| program.trim().is_empty()) {
                diag.error(field, "command must name a program");
            }
        }

        if self.mermaid.background.trim().is_empty() {
            diag.error_with_hint(
                "mermaid.background",
                "background must not be empty",
                "use \"transparent\" or a CSS color such as \"white\"",
            );
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.preview.debounce_ms)
    }
}
