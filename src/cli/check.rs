//! `check`: probe every configured diagram tool.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::backend::DiagramType;
use crate::compiler::{DiagramCompiler, MermaidCli, PlantUml, Structurizr};
use crate::config::PreviewConfig;
use crate::log;

/// The compiler each diagram type ends up invoking.
pub fn compilers(config: &PreviewConfig) -> [(DiagramType, Box<dyn DiagramCompiler>); 3] {
    [
        (
            DiagramType::Mermaid,
            Box::new(MermaidCli::new(
                config.mermaid.command.clone(),
                config.mermaid.background.clone(),
            )),
        ),
        (
            DiagramType::PlantUml,
            Box::new(PlantUml::new(
                config.plantuml.command.clone(),
                config.plantuml.format,
            )),
        ),
        (
            DiagramType::Structurizr,
            Box::new(Structurizr::new(
                config.structurizr.command.clone(),
                PlantUml::new(config.plantuml.command.clone(), config.structurizr.format),
            )),
        ),
    ]
}

pub fn check_tools(config: &PreviewConfig) -> Result<()> {
    let compilers = compilers(config);
    let mut missing = 0;

    for (diagram, compiler) in &compilers {
        match compiler.probe() {
            Ok(()) => log!("check"; "{} {:<12} ok", "✓".green(), diagram.name()),
            Err(e) => {
                missing += 1;
                log!("check"; "{} {:<12} {}", "✗".red(), diagram.name(), e);
            }
        }
    }

    if missing > 0 {
        bail!("{missing} of {} diagram tools unavailable", compilers.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tools_fail_the_check() {
        let mut config = PreviewConfig::default();
        config.mermaid.command = vec!["definitely-not-mmdc-7f3a".into()];
        config.plantuml.command = vec!["definitely-not-plantuml-7f3a".into()];
        config.structurizr.command = vec!["definitely-not-structurizr-7f3a".into()];

        let err = check_tools(&config).unwrap_err();
        assert!(err.to_string().contains("3 of 3"));
    }

    #[test]
    fn test_compilers_cover_every_diagram_type() {
        let names: Vec<_> = compilers(&PreviewConfig::default())
            .iter()
            .map(|(diagram, compiler)| (diagram.name(), compiler.name()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("mermaid", "mermaid"),
                ("plantuml", "plantuml"),
                ("structurizr", "structurizr"),
            ]
        );
    }
}
