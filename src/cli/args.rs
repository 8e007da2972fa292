//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

use crate::config::PreviewConfig;
use crate::core::{ImageFormat, Theme};

/// Live preview for Mermaid, PlantUML and Structurizr diagrams
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: preview.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a diagram once
    #[command(visible_alias = "r")]
    Render {
        /// Diagram source (.mmd, .mermaid, .puml, .dsl)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Image format for PlantUML and Structurizr
        #[arg(short, long, value_enum)]
        format: Option<ImageFormat>,
    },

    /// Re-render a diagram whenever it changes
    #[command(visible_alias = "w")]
    Watch {
        /// Diagram source (.mmd, .mermaid, .puml, .dsl)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check that the configured diagram tools are installed
    Check,

    /// Show which backend renders each file extension
    Backends,
}

/// Output arguments shared by Render and Watch
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output image path (default: next to the source)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Diagram theme
    #[arg(short, long, value_enum)]
    pub theme: Option<Theme>,
}

impl OutputArgs {
    /// Apply CLI overrides on top of the file config.
    pub fn apply(&self, config: &mut PreviewConfig) {
        if let Some(theme) = self.theme {
            config.preview.theme = theme;
        }
    }

    /// Output path for `source`, `.svg` unless the result turns out PNG.
    pub fn output_for(&self, source: &std::path::Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| source.with_extension(ImageFormat::Svg.extension()))
    }
}
