//! Command-line interface module.

mod args;
pub mod backends;
pub mod check;
pub mod render;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::compiler::MermaidCli;
use crate::config::PreviewConfig;
use crate::surface::{CompilerEngine, FileCanvas, SpawnedSurface, Surface};

pub use args::{Cli, Commands, OutputArgs};

/// Runtime for the panel actors. Two workers are plenty: compilers run on
/// the blocking pool.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")
}

/// Headless surface writing to `output`, rendering Mermaid with the CLI.
fn file_surface(config: &PreviewConfig, output: PathBuf) -> SpawnedSurface {
    let engine = CompilerEngine::new(MermaidCli::new(
        config.mermaid.command.clone(),
        config.mermaid.background.clone(),
    ));
    Surface::spawn(FileCanvas::new(output), engine)
}
