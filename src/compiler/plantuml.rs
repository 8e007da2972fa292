use super::{CompileError, CompiledImage, DiagramCompiler, probe_command};
use crate::core::{ImageFormat, Theme};
use crate::utils::exec::{Cmd, failure_message};

const HINT: &str = "install PlantUML (https://plantuml.com/download) or set `[plantuml] command` in preview.toml";

/// PlantUML driven in `-pipe` mode: source on stdin, image on stdout.
#[derive(Debug, Clone)]
pub struct PlantUml {
    command: Vec<String>,
    format: ImageFormat,
}

impl PlantUml {
    pub fn new(command: Vec<String>, format: ImageFormat) -> Self {
        Self { command, format }
    }

    fn format_flag(&self) -> &'static str {
        match self.format {
            ImageFormat::Svg => "-tsvg",
            ImageFormat::Png => "-tpng",
        }
    }

    fn tool(&self) -> String {
        self.command.first().cloned().unwrap_or_else(|| "plantuml".into())
    }
}

impl DiagramCompiler for PlantUml {
    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn probe(&self) -> Result<(), CompileError> {
        probe_command(&self.command, HINT)
    }

    fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
        let mut cmd = Cmd::from_slice(&self.command).args(["-pipe", "-charset", "UTF-8", self.format_flag()]);
        if theme.is_dark() {
            cmd = cmd.arg("-darkmode");
        }

        let output = cmd
            .stdin(source)
            .run()
            .map_err(|e| CompileError::io(self.tool(), e))?;

        if !output.status.success() {
            return Err(parse_pipe_error(&failure_message(&self.tool(), &output)));
        }
        if output.stdout.is_empty() {
            return Err(CompileError::EmptyOutput { tool: self.tool() });
        }

        Ok(match self.format {
            ImageFormat::Svg => CompiledImage::Svg(String::from_utf8_lossy(&output.stdout).into_owned()),
            ImageFormat::Png => CompiledImage::Png(output.stdout),
        })
    }
}

/// Parse PlantUML's pipe-mode error report.
///
/// In `-pipe` mode stderr reads `ERROR`, then the line number, then the
/// description. Anything else is treated as a free-form message.
fn parse_pipe_error(message: &str) -> CompileError {
    let mut lines = message.lines().map(str::trim);
    if lines.next() == Some("ERROR")
        && let Some(line) = lines.next().and_then(|l| l.parse::<u32>().ok())
    {
        let detail: Vec<_> = lines.filter(|l| !l.is_empty()).collect();
        let detail = if detail.is_empty() {
            "syntax error".to_string()
        } else {
            detail.join(" ")
        };
        return CompileError::Syntax {
            message: format!("PlantUML error on line {line}: {detail}"),
            line: Some(line),
        };
    }
    CompileError::syntax(message)
}
