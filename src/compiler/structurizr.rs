use std::fs;
use std::path::{Path, PathBuf};

use super::{CompileError, CompiledImage, DiagramCompiler, PlantUml, probe_command};
use crate::core::Theme;
use crate::utils::exec::{Cmd, failure_message};

const HINT: &str = "install Structurizr CLI (https://github.com/structurizr/cli/releases) or set `[structurizr] command` in preview.toml";

/// Structurizr DSL: exported to PlantUML views, first view rendered by PlantUML.
#[derive(Debug, Clone)]
pub struct Structurizr {
    command: Vec<String>,
    plantuml: PlantUml,
}

impl Structurizr {
    pub fn new(command: Vec<String>, plantuml: PlantUml) -> Self {
        Self { command, plantuml }
    }

    fn tool(&self) -> String {
        self.command
            .first()
            .cloned()
            .unwrap_or_else(|| "structurizr-cli".into())
    }

    /// Export the workspace to PlantUML and return the first view's source.
    fn export(&self, source: &str) -> Result<String, CompileError> {
        let io_err = |e| CompileError::io(self.tool(), e);

        let dir = tempfile::tempdir().map_err(io_err)?;
        let workspace = dir.path().join("workspace.dsl");
        let out_dir = dir.path().join("out");
        fs::write(&workspace, source).map_err(io_err)?;

        let output = Cmd::from_slice(&self.command)
            .args(["export", "-workspace"])
            .arg(&workspace)
            .args(["-format", "plantuml", "-output"])
            .arg(&out_dir)
            .cwd(dir.path())
            .run()
            .map_err(io_err)?;

        if !output.status.success() {
            return Err(CompileError::syntax(failure_message(&self.tool(), &output)));
        }

        let view = first_view(&out_dir).ok_or_else(|| CompileError::EmptyOutput { tool: self.tool() })?;
        fs::read_to_string(&view).map_err(io_err)
    }
}

impl DiagramCompiler for Structurizr {
    fn name(&self) -> &'static str {
        "structurizr"
    }

    fn probe(&self) -> Result<(), CompileError> {
        probe_command(&self.command, HINT)?;
        self.plantuml.probe()
    }

    fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
        let view = self.export(source)?;
        crate::debug!("structurizr"; "exported view: {} bytes", view.len());
        self.plantuml.compile(&view, theme)
    }
}

/// First exported `.puml` view, by file name.
fn first_view(dir: &Path) -> Option<PathBuf> {
    let mut views: Vec<_> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("puml"))
        .collect();
    views.sort();
    views.into_iter().next()
}
