use std::fs;

use super::{CompileError, CompiledImage, DiagramCompiler, probe_command};
use crate::core::Theme;
use crate::utils::exec::{Cmd, failure_message};

const HINT: &str = "install Mermaid CLI with `npm install -g @mermaid-js/mermaid-cli` or set `[mermaid] command` in preview.toml";

/// Mermaid CLI (`mmdc`), file in / file out.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    command: Vec<String>,
    background: String,
}

impl MermaidCli {
    pub fn new(command: Vec<String>, background: impl Into<String>) -> Self {
        Self {
            command,
            background: background.into(),
        }
    }

    fn tool(&self) -> String {
        self.command.first().cloned().unwrap_or_else(|| "mmdc".into())
    }
}

impl DiagramCompiler for MermaidCli {
    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn probe(&self) -> Result<(), CompileError> {
        probe_command(&self.command, HINT)
    }

    fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
        let io_err = |e| CompileError::io(self.tool(), e);

        let dir = tempfile::tempdir().map_err(io_err)?;
        let input = dir.path().join("diagram.mmd");
        let output_path = dir.path().join("diagram.svg");
        fs::write(&input, source).map_err(io_err)?;

        let output = Cmd::from_slice(&self.command)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output_path)
            .args(["-t", theme.engine_theme(), "-b", self.background.as_str(), "-q"])
            .cwd(dir.path())
            .run()
            .map_err(io_err)?;

        if !output.status.success() {
            return Err(CompileError::syntax(failure_message(&self.tool(), &output)));
        }

        let svg = fs::read_to_string(&output_path)
            .map_err(|_| CompileError::EmptyOutput { tool: self.tool() })?;
        Ok(CompiledImage::Svg(svg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_compile_with_stub_tool() {
        // Stub writes a fixed svg to the path following `-o`.
        let script = r#"while [ "$#" -gt 0 ]; do if [ "$1" = "-o" ]; then echo '<svg id="stub"/>' > "$2"; fi; shift; done"#;
        let cli = MermaidCli::new(
            vec!["sh".into(), "-c".into(), script.into(), "mmdc".into()],
            "transparent",
        );
        let image = cli.compile("graph TD;A-->B", Theme::Dark).unwrap();
        assert_eq!(image, CompiledImage::Svg("<svg id=\"stub\"/>\n".into()));
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_error_carries_line() {
        let script = "echo 'Error: Parse error on line 2:' >&2; exit 1";
        let cli = MermaidCli::new(
            vec!["sh".into(), "-c".into(), script.into(), "mmdc".into()],
            "white",
        );
        let err = cli.compile("graph TD;\nA-->", Theme::Light).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
