use std::sync::Arc;

use super::{ExternalAdapter, MermaidAdapter, Renderer};
use crate::backend::{BackendDescriptor, DiagramType};
use crate::compiler::{DiagramCompiler, PlantUml, Structurizr};
use crate::config::PreviewConfig;
use crate::core::Theme;

/// One adapter per diagram family, shared by every panel.
pub struct Backends {
    mermaid: Arc<MermaidAdapter>,
    plantuml: Arc<ExternalAdapter>,
    structurizr: Arc<ExternalAdapter>,
}

impl Backends {
    /// Adapters backed by the configured command-line tools.
    pub fn new(config: &PreviewConfig) -> Self {
        let plantuml = PlantUml::new(config.plantuml.command.clone(), config.plantuml.format);
        let structurizr = Structurizr::new(
            config.structurizr.command.clone(),
            PlantUml::new(config.plantuml.command.clone(), config.structurizr.format),
        );
        Self::with_compilers(
            config.preview.cache_capacity,
            config.preview.theme,
            Box::new(plantuml),
            Box::new(structurizr),
        )
    }

    pub fn with_compilers(
        cache_capacity: usize,
        theme: Theme,
        plantuml: Box<dyn DiagramCompiler>,
        structurizr: Box<dyn DiagramCompiler>,
    ) -> Self {
        Self {
            mermaid: Arc::new(MermaidAdapter::new(cache_capacity, theme)),
            plantuml: Arc::new(ExternalAdapter::new(
                DiagramType::PlantUml,
                plantuml,
                cache_capacity,
            )),
            structurizr: Arc::new(ExternalAdapter::new(
                DiagramType::Structurizr,
                structurizr,
                cache_capacity,
            )),
        }
    }

    pub fn get(&self, diagram: DiagramType) -> Arc<dyn Renderer> {
        match diagram {
            DiagramType::Mermaid => self.mermaid.clone(),
            DiagramType::PlantUml => self.plantuml.clone(),
            DiagramType::Structurizr => self.structurizr.clone(),
        }
    }

    pub fn for_descriptor(&self, descriptor: BackendDescriptor) -> Arc<dyn Renderer> {
        self.get(descriptor.diagram)
    }

    pub fn all(&self) -> [Arc<dyn Renderer>; 3] {
        DiagramType::ALL.map(|diagram| self.get(diagram))
    }

    pub fn mermaid(&self) -> &MermaidAdapter {
        &self.mermaid
    }

    pub fn plantuml(&self) -> &ExternalAdapter {
        &self.plantuml
    }

    pub fn structurizr(&self) -> &ExternalAdapter {
        &self.structurizr
    }

    pub fn handle_theme_change(&self, theme: Theme) {
        for adapter in self.all() {
            adapter.handle_theme_change(theme);
        }
    }

    pub fn dispose(&self) {
        for adapter in self.all() {
            adapter.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RenderOutcome;
    use crate::adapter::testing::CountingCompiler;
    use crate::backend::resolve;
    use crate::cache::generate_key;
    use crate::core::RenderOptions;

    fn backends() -> Backends {
        Backends::with_compilers(
            5,
            Theme::Light,
            Box::new(CountingCompiler::default()),
            Box::new(CountingCompiler::default()),
        )
    }

    #[test]
    fn test_every_extension_has_an_adapter() {
        let backends = backends();
        for (ext, name) in [
            ("mmd", "mermaid"),
            ("mermaid", "mermaid"),
            ("puml", "plantuml"),
            ("dsl", "structurizr"),
        ] {
            let adapter = backends.for_descriptor(resolve(ext).unwrap());
            assert_eq!(adapter.name(), name);
            assert!(adapter.supported_extensions().contains(&ext));
        }
    }

    #[test]
    fn test_theme_change_reaches_every_cache() {
        let backends = backends();
        for (path, content) in [("a.puml", "A -> B"), ("a.dsl", "workspace {}")] {
            let desc = crate::backend::resolve_path(path.as_ref()).unwrap();
            let options = RenderOptions::new(Theme::Light, generate_key(path, content));
            let outcome = backends.for_descriptor(desc).render(content, &options);
            assert!(matches!(outcome, RenderOutcome::Ready(_)));
        }
        assert_eq!(backends.plantuml().cache().len(), 1);
        assert_eq!(backends.structurizr().cache().len(), 1);

        backends.handle_theme_change(Theme::Dark);
        assert!(backends.plantuml().cache().is_empty());
        assert!(backends.structurizr().cache().is_empty());
        assert!(backends.mermaid().cache().is_empty());
    }

    #[test]
    fn test_default_config_wires_tools() {
        let backends = Backends::new(&PreviewConfig::default());
        assert_eq!(backends.plantuml().compiler().name(), "plantuml");
        assert_eq!(backends.structurizr().compiler().name(), "structurizr");
        assert_eq!(backends.plantuml().cache().capacity(), 50);
    }
}
