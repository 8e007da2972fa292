use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{RenderOutcome, Renderer};
use crate::backend::DiagramType;
use crate::cache::RenderCache;
use crate::compiler::DiagramCompiler;
use crate::core::{RenderOptions, RenderResult, Theme};

/// Compiler-family adapter (PlantUML, Structurizr).
///
/// Probes the tool before each miss so a missing install is reported as
/// such instead of as a failed render.
///
/// A compile already running can't be stopped, so every write-through is
/// tagged with the generation it started in. Theme changes and dispose bump
/// the generation; results from an older one are returned but never cached.
pub struct ExternalAdapter {
    diagram: DiagramType,
    compiler: Box<dyn DiagramCompiler>,
    cache: RenderCache,
    generation: AtomicU64,
}

impl ExternalAdapter {
    pub fn new(
        diagram: DiagramType,
        compiler: Box<dyn DiagramCompiler>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            diagram,
            compiler,
            cache: RenderCache::new(cache_capacity),
            generation: AtomicU64::new(0),
        }
    }

    pub fn diagram(&self) -> DiagramType {
        self.diagram
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn compiler(&self) -> &dyn DiagramCompiler {
        self.compiler.as_ref()
    }
}

impl Renderer for ExternalAdapter {
    fn name(&self) -> &'static str {
        self.diagram.name()
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        self.diagram.extensions()
    }

    fn render(&self, content: &str, options: &RenderOptions) -> RenderOutcome {
        if let Some(hit) = self.cache.get(&options.cache_key) {
            crate::debug!(self.name(); "cache hit {}", options.cache_key);
            return RenderOutcome::Ready(hit);
        }

        if let Err(e) = self.compiler.probe() {
            return RenderOutcome::ready(RenderResult::from(e));
        }

        crate::debug!(self.name(); "cache miss, running {}", self.compiler.name());
        let started = self.generation.load(Ordering::SeqCst);
        match self.compiler.compile(content, options.theme) {
            Ok(image) => {
                let result = Arc::new(RenderResult::from(image));
                if self.generation.load(Ordering::SeqCst) == started {
                    self.cache.set(options.cache_key.clone(), Arc::clone(&result));
                } else {
                    crate::debug!(self.name(); "outdated result for {}, not cached", options.cache_key);
                }
                RenderOutcome::Ready(result)
            }
            Err(e) => RenderOutcome::ready(RenderResult::from(e)),
        }
    }

    fn handle_theme_change(&self, theme: Theme) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
        crate::debug!(self.name(); "theme -> {}, cache cleared", theme.engine_theme());
    }

    fn dispose(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
        crate::debug!(self.name(); "disposed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::adapter::testing::CountingCompiler;
    use crate::cache::generate_key;
    use crate::compiler::{CompileError, CompiledImage};

    /// Compiler that blocks inside `compile` until the test releases it.
    struct GatedCompiler {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl DiagramCompiler for GatedCompiler {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn probe(&self) -> Result<(), CompileError> {
            Ok(())
        }

        fn compile(&self, _source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(CompiledImage::Svg(format!("<svg data-theme=\"{}\"/>", theme.name())))
        }
    }

    fn gated() -> (Arc<ExternalAdapter>, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let compiler = GatedCompiler {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let adapter = ExternalAdapter::new(DiagramType::PlantUml, Box::new(compiler), 10);
        (Arc::new(adapter), entered_rx, release_tx)
    }

    fn adapter(stub: CountingCompiler) -> (ExternalAdapter, Arc<CountingCompiler>) {
        let stub = Arc::new(stub);
        let adapter = ExternalAdapter::new(
            DiagramType::PlantUml,
            Box::new(Arc::clone(&stub)),
            10,
        );
        (adapter, stub)
    }

    fn ready(outcome: RenderOutcome) -> Arc<RenderResult> {
        match outcome {
            RenderOutcome::Ready(result) => result,
            RenderOutcome::Deferred(request) => panic!("unexpected deferral {request:?}"),
        }
    }

    #[test]
    fn test_cache_hit_skips_compiler() {
        let (adapter, stub) = adapter(CountingCompiler::default());
        let content = "@startuml\nA -> B\n@enduml";
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", content));

        let first = ready(adapter.render(content, &options));
        let second = ready(adapter.render(content, &options));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let (adapter, stub) = adapter(CountingCompiler::default());
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "error"));

        let result = ready(adapter.render("error", &options));
        assert_eq!(*result, RenderResult::error_at("Syntax Error? (line 2)", Some(2)));
        ready(adapter.render("error", &options));
        assert_eq!(stub.calls(), 2);
        assert!(adapter.cache().is_empty());
    }

    #[test]
    fn test_unavailable_tool_is_actionable() {
        let (adapter, stub) = adapter(CountingCompiler::unavailable());
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "A -> B"));

        let result = ready(adapter.render("A -> B", &options));
        let text = result.error_text().unwrap();
        assert!(text.contains("not available"));
        assert!(text.contains("install stub"));
        assert_eq!(stub.calls(), 0);
        assert_eq!(stub.probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_png_results_pass_through() {
        let (adapter, _stub) = adapter(CountingCompiler::default());
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "png"));
        assert_eq!(ready(adapter.render("png", &options)).kind(), "png");
    }

    #[test]
    fn test_theme_change_empties_cache() {
        let (adapter, stub) = adapter(CountingCompiler::default());
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "A -> B"));
        ready(adapter.render("A -> B", &options));
        assert_eq!(adapter.cache().len(), 1);

        adapter.handle_theme_change(Theme::Dark);
        assert!(adapter.cache().is_empty());

        let dark = RenderOptions::new(Theme::Dark, options.cache_key.clone());
        let result = ready(adapter.render("A -> B", &dark));
        assert!(matches!(&*result, RenderResult::Svg(svg) if svg.contains("dark")));
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_compile_outliving_theme_change_is_not_cached() {
        let (adapter, entered, release) = gated();
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "A -> B"));

        let worker = {
            let adapter = Arc::clone(&adapter);
            let options = options.clone();
            thread::spawn(move || adapter.render("A -> B", &options))
        };
        entered.recv().unwrap();
        adapter.handle_theme_change(Theme::Dark);
        release.send(()).unwrap();

        let light = ready(worker.join().unwrap());
        assert!(matches!(&*light, RenderResult::Svg(svg) if svg.contains("light")));
        assert!(adapter.cache().get(&options.cache_key).is_none());

        // the next render under the new theme does populate the cache
        let dark = RenderOptions::new(Theme::Dark, options.cache_key.clone());
        let worker = {
            let adapter = Arc::clone(&adapter);
            thread::spawn(move || adapter.render("A -> B", &dark))
        };
        entered.recv().unwrap();
        release.send(()).unwrap();
        ready(worker.join().unwrap());
        let cached = adapter.cache().get(&options.cache_key).unwrap();
        assert!(matches!(&*cached, RenderResult::Svg(svg) if svg.contains("dark")));
    }

    #[test]
    fn test_compile_outliving_dispose_is_not_cached() {
        let (adapter, entered, release) = gated();
        let options = RenderOptions::new(Theme::Light, generate_key("a.puml", "A -> B"));

        let worker = {
            let adapter = Arc::clone(&adapter);
            let options = options.clone();
            thread::spawn(move || adapter.render("A -> B", &options))
        };
        entered.recv().unwrap();
        adapter.dispose();
        release.send(()).unwrap();

        ready(worker.join().unwrap());
        assert!(adapter.cache().is_empty());
    }
}
